fn main() -> anyhow::Result<()> {
    numbench::run()
}
