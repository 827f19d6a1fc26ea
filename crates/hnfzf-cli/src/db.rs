//! `db` subcommands. Both need `DATABASE_URL`.

pub(crate) async fn run_migrate() -> anyhow::Result<()> {
    let pool = connect().await?;
    let applied = hnfzf_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

pub(crate) async fn run_ping() -> anyhow::Result<()> {
    let pool = connect().await?;
    hnfzf_db::health_check(&pool).await?;
    println!("database ok");
    Ok(())
}

async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let config = hnfzf_core::load_app_config()?;
    let pool = hnfzf_db::connect_pool(
        &config.database_url,
        hnfzf_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    tracing::debug!(env = %config.env, "connected to database");
    Ok(pool)
}
