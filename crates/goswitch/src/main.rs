use clap::Parser;
use goswitch_platform::EnvMap;

mod cli;
mod telemetry;

fn main() {
    let env = EnvMap::from_process();
    let app = cli::App::parse();

    let code = match cli::Context::load(env).and_then(|ctx| {
        telemetry::init(ctx.settings.debug);
        ctx.run(app.cmd)
    }) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("goswitch: {err:#}");
            1
        }
    };
    std::process::exit(code);
}
