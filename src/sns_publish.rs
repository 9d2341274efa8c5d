use clap::Parser;
use opentelemetry::trace::TracerProvider;
use playground::cli::{self, CommonArgs};
use playground::publish::{self, PublishArgs};
use playground::segment::SegmentTracer;
use playground::{cancel, logging, telemetry};
use tracing::{error, warn};

/// Publish one message to an SNS topic.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    publish: PublishArgs,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() {
    let dotenv = cli::load_dotenv();
    let args = Cli::parse();
    if let Err(e) = logging::init() {
        eprintln!("{e:#}");
    }
    if let Err(e) = dotenv {
        warn!(error = %e, "failed to load .env");
    }
    if let Err(err) = args.publish.validate() {
        error!("{err:#}");
        std::process::exit(1);
    }

    let app = cli::app_name();
    let token = cancel::interrupt_token();
    let provider = telemetry::init_tracer_provider(&app);
    let tracer = SegmentTracer::new(
        provider.tracer(app.clone()),
        logging::xray_logger(args.common.xray_log_level),
    );

    let result = publish::run(&args.publish, &args.common, &app, &tracer, &token).await;
    telemetry::shutdown(provider);

    if let Err(err) = result {
        error!("{err:#}");
        std::process::exit(1);
    }
}
