use clap::Parser;
use colibri::app::ColibriApp;
use colibri::pipeline::PipelineError;

fn main() -> Result<(), PipelineError> {
    env_logger::init();
    let args = ColibriApp::parse();
    args.op.run()
}
