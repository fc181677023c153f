use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, middleware, Responder};
use actix_cors::Cors;
use promptbench::api::{configure_routes, handlers::WsBroker, AppState};
use promptbench::banner;
use promptbench::config::AppConfig;
use rust_embed::RustEmbed;
use std::borrow::Cow;

#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    banner::print_banner();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let bind = app_config.bind_address();
    log::info!("Using prompt backend at {}", app_config.api_url);
    if let Some(limit) = app_config.max_concurrency {
        log::info!("Probe batches limited to {} concurrent executions", limit);
    }

    let state = match AppState::new(app_config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to initialise application state: {}", e);
            std::process::exit(1);
        }
    };

    let broker = WsBroker::new();
    broker.forward(state.workbench.subscribe());

    println!("🚀 Starting server...");
    println!("📊 Console available at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(broker.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
            .route("/{_:.*}", web::get().to(static_file_handler))
    })
    .bind(bind)?
    .run()
    .await
}

async fn static_file_handler(req: HttpRequest) -> impl Responder {
    let path = if req.path() == "/" {
        "index.html"
    } else {
        // trim leading '/'
        &req.path()[1..]
    };

    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            HttpResponse::Ok().content_type(mime.as_ref()).body(Cow::into_owned(content.data))
        }
        None => HttpResponse::NotFound().body("404 Not Found"),
    }
}
