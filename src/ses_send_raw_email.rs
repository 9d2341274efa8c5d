use clap::Parser;
use opentelemetry::trace::TracerProvider;
use playground::cli::{self, CommonArgs};
use playground::email::{self, SendRawEmailArgs};
use playground::segment::SegmentTracer;
use playground::{cancel, logging, telemetry};
use tracing::{error, warn};

/// Send a raw MIME email through SES.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    email: SendRawEmailArgs,

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
    if let Err(err) = args.email.validate() {
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

    let result = email::run(&args.email, &args.common, &app, &tracer, &token).await;
    telemetry::shutdown(provider);

    if let Err(err) = result {
        error!("{err:#}");
        std::process::exit(1);
    }
}
