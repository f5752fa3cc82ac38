#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = rupadi_lib::run().await {
        log::error!("❌ Rupadi interviewer failed: {:#}", e);
        std::process::exit(1);
    }
}
