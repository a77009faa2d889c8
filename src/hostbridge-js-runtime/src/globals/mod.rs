use rquickjs::Ctx;

mod output;
mod require;

pub fn setup(ctx: &Ctx<'_>) -> rquickjs::Result<()> {
    output::setup(ctx)?;
    require::setup(ctx)?;
    Ok(())
}
