//! Reference landing page
//!
//! A laid-out page carrying every hook the behavior layer looks for. The
//! demo binary drives it, and tests use it as a fixture.
//!
//! Geometry (document coordinates, 1280px wide):
//!
//! | element          | top  | height |
//! |------------------|------|--------|
//! | `#header`        | 0    | 80     |
//! | `section#home`   | 0    | 500    |
//! | `section#about`  | 500  | 700    |
//! | `section#contact`| 1200 | 800    |

use folio_dom::{Document, NodeId, Page};

pub const LANDING_URL: &str = "https://folio.example/";

/// Build the landing page
pub fn landing_page() -> Page {
    let mut doc = Document::new(LANDING_URL);
    let body = doc.body();

    header(&mut doc, body);

    let main = doc.build("main").id("main").append_to(body);
    home(&mut doc, main);
    about(&mut doc, main);
    contact(&mut doc, main);
    chat(&mut doc, body);

    Page::with_document(doc)
}

fn header(doc: &mut Document, body: NodeId) {
    let header = doc.build("header").id("header").rect(0.0, 0.0, 1280.0, 80.0).append_to(body);
    doc.build("a").class("logo").attr("href", "#home").text("Folio").append_to(header);
    doc.build("button")
        .id("nav-toggle")
        .attr("type", "button")
        .attr("aria-controls", "nav")
        .attr("aria-expanded", "false")
        .attr("aria-label", "Menu")
        .append_to(header);

    let nav = doc.build("nav").id("nav").append_to(header);
    let list = doc.build("ul").append_to(nav);
    for (id, label) in [("home", "Home"), ("about", "About"), ("contact", "Contact")] {
        let item = doc.build("li").append_to(list);
        doc.build("a")
            .class("nav-link")
            .attr("href", &format!("#{id}"))
            .text(label)
            .append_to(item);
    }
}

fn home(doc: &mut Document, main: NodeId) {
    let home = doc.build("section").id("home").rect(0.0, 0.0, 1280.0, 500.0).append_to(main);
    doc.build("h1").text("Build a site people remember").append_to(home);
    doc.build("button")
        .class("cta")
        .attr("type", "button")
        .attr("data-action", "open-chat")
        .text("Talk to us")
        .rect(100.0, 300.0, 160.0, 48.0)
        .append_to(home);
    doc.build("button")
        .class("cta-secondary")
        .attr("type", "button")
        .attr("data-action", "scroll-to")
        .attr("data-target", "#contact")
        .text("Get in touch")
        .rect(280.0, 300.0, 160.0, 48.0)
        .append_to(home);
}

fn about(doc: &mut Document, main: NodeId) {
    let about = doc.build("section").id("about").rect(0.0, 500.0, 1280.0, 700.0).append_to(main);
    doc.build("h2").text("About").append_to(about);
    for (i, top) in [620.0, 780.0, 940.0].into_iter().enumerate() {
        doc.build("div")
            .class("feature")
            .attr("data-animate", "fade-up")
            .text(&format!("Feature {}", i + 1))
            .rect(100.0, top, 320.0, 140.0)
            .append_to(about);
    }
    doc.build("img")
        .class("lazy")
        .attr("data-src", "/img/team.jpg")
        .attr("alt", "Team")
        .rect(640.0, 900.0, 480.0, 240.0)
        .append_to(about);
}

fn contact(doc: &mut Document, main: NodeId) {
    let contact = doc.build("section").id("contact").rect(0.0, 1200.0, 1280.0, 800.0).append_to(main);
    doc.build("h2").text("Contact").append_to(contact);

    let newsletter = doc.build("form").class("newsletter-form").attr("novalidate", "").append_to(contact);
    doc.build("input")
        .attr("type", "email")
        .attr("name", "email")
        .attr("placeholder", "you@example.com")
        .attr("required", "")
        .append_to(newsletter);
    doc.build("button").attr("type", "submit").text("Subscribe").append_to(newsletter);

    let quote = doc
        .build("form")
        .id("quote-form")
        .attr("data-validate", "")
        .attr("novalidate", "")
        .append_to(contact);
    doc.build("input")
        .id("company")
        .attr("name", "company")
        .attr("required", "")
        .attr("minlength", "2")
        .append_to(quote);
    doc.build("input")
        .id("work-email")
        .attr("type", "email")
        .attr("name", "work-email")
        .attr("required", "")
        .append_to(quote);
    doc.build("textarea").id("details").attr("name", "details").append_to(quote);
    doc.build("input").attr("type", "hidden").attr("name", "source").value("landing").append_to(quote);
    doc.build("button").attr("type", "submit").text("Request a quote").append_to(quote);

    doc.build("img")
        .class("lazy")
        .attr("data-src", "/img/office.jpg")
        .attr("alt", "Office")
        .rect(640.0, 1700.0, 480.0, 240.0)
        .append_to(contact);
}

fn chat(doc: &mut Document, body: NodeId) {
    doc.build("button")
        .id("chat-toggle")
        .attr("type", "button")
        .attr("aria-controls", "chat-panel")
        .attr("aria-expanded", "false")
        .attr("aria-label", "Open chat")
        .append_to(body);

    let panel = doc
        .build("div")
        .id("chat-panel")
        .attr("role", "dialog")
        .attr("aria-hidden", "true")
        .append_to(body);
    doc.build("button")
        .id("chat-close")
        .attr("type", "button")
        .attr("aria-label", "Close chat")
        .append_to(panel);
    doc.build("div").class("chat-messages").attr("aria-live", "polite").append_to(panel);
    doc.build("div").class("chat-status").append_to(panel);

    let form = doc.build("form").class("chat-form").attr("novalidate", "").append_to(panel);
    doc.build("input").attr("name", "name").attr("placeholder", "Your name").append_to(form);
    doc.build("input")
        .attr("type", "email")
        .attr("name", "email")
        .attr("placeholder", "Email")
        .append_to(form);
    doc.build("textarea").attr("name", "message").attr("placeholder", "How can we help?").append_to(form);
    doc.build("button").attr("type", "submit").text("Send").append_to(form);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ElementCache;

    #[test]
    fn test_landing_page_populates_cache() {
        let mut page = landing_page();
        let cache = ElementCache::build(&mut page.document).unwrap();
        let entries: std::collections::HashMap<_, _> = cache.entries().into_iter().collect();

        assert_eq!(entries["navLinks"], 3);
        assert_eq!(entries["sections"], 3);
        assert_eq!(entries["lazyImages"], 2);
        assert_eq!(entries["animated"], 3);
        assert_eq!(entries["actions"], 2);
        assert_eq!(entries["newsletterForms"], 1);
        assert_eq!(entries["validatedForms"], 1);
        for name in ["header", "nav", "navToggle", "chatToggle", "chatPanel", "chatForm", "chatStatus", "backToTop"] {
            assert_eq!(entries[name], 1, "{name}");
        }
    }
}
