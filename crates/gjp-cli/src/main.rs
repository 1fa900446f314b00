mod chart;
mod command;
mod table;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
