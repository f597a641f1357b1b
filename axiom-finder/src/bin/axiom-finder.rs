use axiom_finder::App;
use clap::Parser;

fn main() {
    pretty_env_logger::init();
    let app = App::parse();
    app.exec();
}
