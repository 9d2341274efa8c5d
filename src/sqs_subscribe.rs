use clap::Parser;
use opentelemetry::trace::TracerProvider;
use playground::cli::{self, CommonArgs};
use playground::segment::SegmentTracer;
use playground::subscribe::{self, SubscribeArgs};
use playground::{cancel, logging, telemetry};
use tracing::{error, warn};

/// Long-poll an SQS queue, print every receive and delete what arrives.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    subscribe: SubscribeArgs,

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
    if let Err(err) = args.subscribe.validate() {
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

    let result = subscribe::run(&args.subscribe, &args.common, &app, tracer, &token).await;
    telemetry::shutdown(provider);

    if let Err(err) = result {
        if cancel::is_shutdown(&err, &token) {
            return;
        }
        error!("{err:#}");
        std::process::exit(1);
    }
}
