fn main() -> anyhow::Result<()> {
    simsloca::cli::run_cli()
}
