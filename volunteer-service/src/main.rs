use log::info;

mod handlers;
mod models;
mod routes;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting Volunteer Service Lambda");

    let app = routes::create_router().await;
    lambda_http::run(app).await
}
