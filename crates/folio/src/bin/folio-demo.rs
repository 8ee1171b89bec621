//! Scripted session against the reference landing page
//!
//! Usage: `folio-demo [config.json]`

use anyhow::Context;
use folio::{Config, Error, Site, demo};
use folio_dom::{NodeId, Page};

fn element(page: &Page, name: &'static str, selector: &str) -> Result<NodeId, Error> {
    page.document
        .query_selector(selector)?
        .ok_or(Error::MissingElement(name))
}

fn main() -> anyhow::Result<()> {
    folio::logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            Config::from_json(&json).with_context(|| format!("parsing {path}"))?
        }
        None => Config {
            transport_seed: Some(7),
            ..Config::default()
        },
    };

    let mut site = Site::new(demo::landing_page(), config)?;
    site.page_mut().window.data_layer = Some(Vec::new());
    site.ready();
    println!("Folio v{} ready", folio::VERSION);

    site.scroll_to(650.0);
    site.advance(100);

    site.open_chat();
    site.advance(300);
    let form = element(site.page(), "chat form", ".chat-form")?;
    let name = element(site.page(), "chat name", ".chat-form [name=name]")?;
    let email = element(site.page(), "chat email", ".chat-form [name=email]")?;
    let message = element(site.page(), "chat message", ".chat-form [name=message]")?;
    site.type_into(name, "Ada");
    site.type_into(email, "ada@example.com");
    site.type_into(message, "Do you build landing pages?");
    site.submit(form);
    site.advance(2000);

    let transcript = element(site.page(), "chat transcript", ".chat-messages")?;
    println!("Transcript: {}", site.page().document.text_content(transcript).trim());
    site.advance(3000);

    if let Some(snapshot) = site.debug() {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    if let Some(events) = &site.page().window.data_layer {
        println!("Analytics events: {}", events.len());
    }

    site.destroy();
    Ok(())
}
