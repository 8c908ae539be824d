//! Shared fixtures for folio-core integration tests

#![allow(dead_code)]

use folio_core::{
    Document, ElementSpec, EngineConfig, MemoryDocument, MemoryPreferences, NodeId, PageSpec,
    Selector, UiEngine,
};

pub type TestEngine = UiEngine<MemoryDocument, MemoryPreferences>;

/// Route engine logs through the test harness (`RUST_LOG=debug cargo test`)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn header() -> ElementSpec {
    let mut nav = ElementSpec::new("ul").id("navMenu").class("nav-menu");
    for section in ["about", "projects", "blog", "contact"] {
        nav = nav.child(
            ElementSpec::new("li").child(
                ElementSpec::new("a")
                    .class("nav-link")
                    .attr("href", format!("#{}", section))
                    .text(section),
            ),
        );
    }
    ElementSpec::new("header").class("header").child(
        ElementSpec::new("nav")
            .class("navbar")
            .child(ElementSpec::new("a").class("logo").attr("href", "#").text("Folio"))
            .child(nav)
            .child(
                ElementSpec::new("button")
                    .id("themeToggle")
                    .class("theme-toggle")
                    .child(ElementSpec::new("span").class("theme-icon").text("☀️")),
            )
            .child(ElementSpec::new("button").id("menuToggle").class("menu-toggle")),
    )
}

fn about() -> ElementSpec {
    let mut stats = ElementSpec::new("div").class("stats");
    for (value, label) in [("50+", "Projects"), ("1200+ clients", "Clients"), ("8", "Years")] {
        stats = stats.child(
            ElementSpec::new("div")
                .class("stat")
                .child(ElementSpec::new("h4").text(value))
                .child(ElementSpec::new("p").text(label)),
        );
    }
    ElementSpec::new("section").id("about").child(stats)
}

fn projects() -> ElementSpec {
    let mut filters = ElementSpec::new("div").class("project-filters");
    for value in ["all", "web", "mobile", "design"] {
        let mut button = ElementSpec::new("button")
            .class("filter-btn")
            .attr("data-filter", value)
            .text(value);
        if value == "all" {
            button = button.class("active");
        }
        filters = filters.child(button);
    }
    let mut grid = ElementSpec::new("div").class("projects-grid");
    for (title, category) in [
        ("Shop", "web"),
        ("Tracker", "mobile"),
        ("Brand", "design"),
        ("Dashboard", "web"),
        ("Chat", "mobile"),
    ] {
        grid = grid.child(
            ElementSpec::new("div")
                .class("project-card")
                .attr("data-category", category)
                .child(ElementSpec::new("h3").text(title)),
        );
    }
    ElementSpec::new("section").id("projects").child(filters).child(grid)
}

fn blog() -> ElementSpec {
    let mut section = ElementSpec::new("section").id("blog");
    for title in ["First post", "Second post"] {
        section = section.child(
            ElementSpec::new("article").class("blog-card").child(
                ElementSpec::new("div")
                    .class("blog-content")
                    .child(ElementSpec::new("h3").text(title))
                    .child(ElementSpec::new("p").class("blog-excerpt").text("Short version"))
                    .child(
                        ElementSpec::new("div")
                            .class("blog-full-content")
                            .text("The whole long version of the post"),
                    )
                    .child(
                        ElementSpec::new("a")
                            .class("read-more")
                            .attr("href", "#")
                            .attr("data-expanded", "false")
                            .text("Read More →"),
                    ),
            ),
        );
    }
    section
}

fn contact() -> ElementSpec {
    let mut form = ElementSpec::new("form").id("contactForm");
    for field in ["name", "email", "subject"] {
        form = form.child(
            ElementSpec::new("div")
                .class("form-group")
                .child(ElementSpec::new("input").id(field).attr("name", field))
                .child(
                    ElementSpec::new("span")
                        .id(format!("{}Error", field))
                        .class("error-message"),
                ),
        );
    }
    form = form
        .child(
            ElementSpec::new("div")
                .class("form-group")
                .child(ElementSpec::new("textarea").id("message").attr("name", "message"))
                .child(ElementSpec::new("span").id("messageError").class("error-message")),
        )
        .child(
            ElementSpec::new("label")
                .child(ElementSpec::new("input").id("terms").attr("type", "checkbox"))
                .child(ElementSpec::new("a").id("termsBtn").attr("href", "#").text("terms")),
        )
        .child(
            ElementSpec::new("button")
                .id("sendBtn")
                .attr("type", "submit")
                .text("Send"),
        );
    ElementSpec::new("section").id("contact").child(form)
}

fn modal() -> ElementSpec {
    ElementSpec::new("div").id("termsModal").class("modal").child(
        ElementSpec::new("div")
            .class("modal-content")
            .child(ElementSpec::new("span").id("closeTerms").class("close").text("×"))
            .child(ElementSpec::new("p").class("terms-text").text("Terms and privacy"))
            .child(ElementSpec::new("button").id("agreeTerms").text("Agree"))
            .child(ElementSpec::new("button").id("declineTerms").text("Decline")),
    )
}

/// The full portfolio page
pub fn portfolio_page() -> PageSpec {
    PageSpec {
        loading: false,
        body: ElementSpec::new("body")
            .child(header())
            .child(about())
            .child(projects())
            .child(blog())
            .child(contact())
            .child(modal())
            .child(ElementSpec::new("footer").child(ElementSpec::new("p").text("© Folio"))),
    }
}

pub fn engine() -> TestEngine {
    engine_with(portfolio_page(), MemoryPreferences::new())
}

pub fn engine_with(page: PageSpec, store: MemoryPreferences) -> TestEngine {
    init_tracing();
    UiEngine::new(MemoryDocument::from_page(&page), store, EngineConfig::default()).unwrap()
}

pub fn by_id(engine: &TestEngine, id: &str) -> NodeId {
    engine
        .document()
        .element_by_id(id)
        .unwrap_or_else(|| panic!("no element #{}", id))
}

pub fn all(engine: &TestEngine, selector: &str) -> Vec<NodeId> {
    engine.document().query_all(&Selector::parse(selector).unwrap())
}

pub fn first(engine: &TestEngine, selector: &str) -> NodeId {
    all(engine, selector)
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("nothing matches {}", selector))
}

/// Type `value` into the control with id `id`
pub fn type_into(engine: &mut TestEngine, id: &str, value: &str) {
    let node = by_id(engine, id);
    engine.document_mut().set_value(node, value);
}
