fn main() -> anyhow::Result<()> {
    formfit_lib::run()
}
