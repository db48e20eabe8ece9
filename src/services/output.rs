use serde::Serialize;

pub fn render<T: Serialize>(data: &T, pretty: bool) -> anyhow::Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    })
}

pub fn print_json<T: Serialize>(data: &T, pretty: bool) -> anyhow::Result<()> {
    println!("{}", render(data, pretty)?);
    Ok(())
}
