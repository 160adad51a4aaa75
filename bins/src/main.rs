use chrono::Local;
use eyre::Context;
use log::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let env = env::Env::load()?;
    pretty_env_logger::init();
    color_eyre::install()?;

    info!("connecting to mongo");
    let storage = match env.db_name() {
        Some(db_name) => storage::Storage::with_db_name(env.mongo_url(), db_name).await,
        None => storage::Storage::new(env.mongo_url()).await,
    }
    .context("Failed to create storage")?;

    let attendance = attendance::Attendance::new(storage);

    let registered = attendance.classes.classes().await?;
    info!("{} classes registered", registered.len());

    let class_ids = attendance.reports.class_ids().await?;
    info!("{} classes have attendance data", class_ids.len());

    let today = Local::now().date_naive();
    let report = attendance.reports.daily_report(&class_ids, today).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
