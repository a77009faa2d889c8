use rquickjs::Coerced;
use rquickjs::prelude::Rest;

use super::io::io::print;

#[rquickjs::module(rename_vars = "camelCase", rename_types = "camelCase")]
#[allow(clippy::module_inception)]
pub mod console {
    use super::*;

    #[rquickjs::function]
    pub fn log(txt: Rest<Coerced<String>>) -> rquickjs::Result<()> {
        let mut line = txt
            .into_inner()
            .into_iter()
            .map(|c| c.0)
            .collect::<Vec<_>>()
            .join(" ");
        line.push('\n');
        print(line);
        Ok(())
    }
}
