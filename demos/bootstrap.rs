use app_context::{init_tracing, AppContext};

#[tokio::main]
async fn main() -> Result<(), app_context::Error> {
    init_tracing();

    // Optional local overrides, then the real environment on top.
    let ctx = AppContext::builder("bootstrap")
        .with_env_file("demos/dev.toml", false)
        .with_process_env()
        .build()?;

    println!("App: {} on {}", ctx.app_name(), ctx.hostname());
    println!("API port: {}", ctx.api_port());
    println!(
        "metrics={} error_report={} database={}",
        ctx.metrics_enabled(),
        ctx.error_report_enabled(),
        ctx.database().is_some()
    );

    ctx.metrics_client().incr("boot");

    let request_ctx = ctx.with_logger(ctx.logger().request("req-1"));
    request_ctx.logger().info("handling first request");

    Ok(())
}
