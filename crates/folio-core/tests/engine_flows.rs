//! End-to-end flows through the UI reaction engine
//!
//! Each test drives a full portfolio page through `UiEngine::dispatch` and
//! checks both the engine's state and what was rendered into the document.

mod common;

use std::time::Duration;

use common::*;
use folio_core::{
    Document, ExpandState, Field, FieldError, Filter, Geometry, MemoryPreferences, ModalState,
    PreferenceStore, ScrollBehavior, SubmitOutcome, Theme, UiEvent,
};

fn click(engine: &mut TestEngine, target: folio_core::NodeId) -> folio_core::DispatchOutcome {
    engine.dispatch(UiEvent::Click { target })
}

// ============================================================================
// Theme
// ============================================================================

#[test]
fn test_theme_defaults_to_dark_and_injects_keyframes() {
    let engine = engine();
    let doc = engine.document();
    assert_eq!(engine.theme(), Some(Theme::Dark));
    assert!(!doc.has_class(doc.body(), "light-mode"));
    assert_eq!(doc.stylesheets().len(), 2);
    assert!(doc.stylesheets()[0].contains("@keyframes fadeIn"));
    assert!(doc.stylesheets()[1].contains("@keyframes slideUp"));
}

#[test]
fn test_theme_toggle_persists_and_restores() {
    let mut engine = engine();
    let toggle = by_id(&engine, "themeToggle");

    let outcome = click(&mut engine, toggle);
    assert!(outcome.default_prevented);
    assert!(outcome.is_clean());
    assert_eq!(engine.theme(), Some(Theme::Light));
    assert_eq!(engine.store().get("theme").unwrap().as_deref(), Some("light"));
    assert_eq!(engine.document().text(toggle), "🌙");

    // A fresh page load with the same store comes up light
    let (_, store) = engine.into_parts();
    let reloaded = engine_with(portfolio_page(), store);
    assert_eq!(reloaded.theme(), Some(Theme::Light));
    let doc = reloaded.document();
    assert!(doc.has_class(doc.body(), "light-mode"));
}

#[test]
fn test_theme_toggle_twice_is_identity() {
    let mut engine = engine_with(portfolio_page(), MemoryPreferences::with("theme", "light"));
    let toggle = by_id(&engine, "themeToggle");
    click(&mut engine, toggle);
    click(&mut engine, toggle);
    assert_eq!(engine.theme(), Some(Theme::Light));
    assert_eq!(engine.store().get("theme").unwrap().as_deref(), Some("light"));
}

// ============================================================================
// Menu and scrolling
// ============================================================================

#[test]
fn test_menu_parity_and_link_close() {
    let mut engine = engine();
    let toggle = by_id(&engine, "menuToggle");
    let panel = by_id(&engine, "navMenu");

    for presses in 1..=4 {
        click(&mut engine, toggle);
        assert_eq!(engine.menu_open(), Some(presses % 2 == 1));
        assert_eq!(engine.document().has_class(panel, "active"), presses % 2 == 1);
        assert_eq!(engine.document().has_class(toggle, "active"), presses % 2 == 1);
    }

    click(&mut engine, toggle);
    let link = first(&engine, ".nav-link");
    let outcome = click(&mut engine, link);
    assert_eq!(engine.menu_open(), Some(false));
    // Nav links are fragment anchors too
    assert!(outcome.default_prevented);
    let about = by_id(&engine, "about");
    let scrolls = engine.document().scrolls();
    assert_eq!(scrolls.len(), 1);
    assert_eq!(scrolls[0].target, about);
    assert_eq!(scrolls[0].behavior, ScrollBehavior::Smooth);
}

#[test]
fn test_click_outside_header_closes_menu() {
    let mut engine = engine();
    let toggle = by_id(&engine, "menuToggle");
    click(&mut engine, toggle);
    let footer = first(&engine, "footer p");
    click(&mut engine, footer);
    assert_eq!(engine.menu_open(), Some(false));
}

// ============================================================================
// Terms modal
// ============================================================================

#[test]
fn test_modal_agree_ticks_terms() {
    let mut engine = engine();
    let open = by_id(&engine, "termsBtn");
    let agree = by_id(&engine, "agreeTerms");
    let terms = by_id(&engine, "terms");

    let outcome = click(&mut engine, open);
    assert!(outcome.default_prevented);
    assert!(outcome.is_clean());
    assert_eq!(engine.modal_state(), Some(ModalState::Shown));

    click(&mut engine, agree);
    assert_eq!(engine.modal_state(), Some(ModalState::Hidden));
    assert!(engine.document().checked(terms));
}

#[test]
fn test_modal_decline_clears_form() {
    let mut engine = engine();
    type_into(&mut engine, "name", "Ada");
    type_into(&mut engine, "email", "bad@");
    let email = by_id(&engine, "email");
    engine.dispatch(UiEvent::Blur { target: email });
    let email_error = by_id(&engine, "emailError");
    assert!(engine.document().has_class(email_error, "show"));

    let open = by_id(&engine, "termsBtn");
    let decline = by_id(&engine, "declineTerms");
    click(&mut engine, open);
    click(&mut engine, decline);

    assert_eq!(engine.modal_state(), Some(ModalState::Hidden));
    assert_eq!(engine.document().value(by_id(&engine, "name")), "");
    assert_eq!(engine.document().value(email), "");
    assert_eq!(engine.document().text(email_error), "");
    assert!(!engine.document().has_class(email_error, "show"));
    assert_eq!(engine.field_status(Field::Email).map(|s| s.is_valid()), Some(true));
}

#[test]
fn test_modal_escape_and_backdrop() {
    let mut engine = engine();
    let open = by_id(&engine, "termsBtn");
    let modal = by_id(&engine, "termsModal");
    let text = first(&engine, ".terms-text");

    click(&mut engine, open);
    engine.dispatch(UiEvent::KeyDown { key: "Escape".into() });
    assert_eq!(engine.modal_state(), Some(ModalState::Hidden));

    click(&mut engine, open);
    click(&mut engine, text);
    assert_eq!(engine.modal_state(), Some(ModalState::Shown));
    click(&mut engine, modal);
    assert_eq!(engine.modal_state(), Some(ModalState::Hidden));
}

// ============================================================================
// Project filter and reveal
// ============================================================================

#[test]
fn test_filter_shows_exactly_matching_cards() {
    let mut engine = engine();
    let mobile = first(&engine, "[data-filter=\"mobile\"]");
    click(&mut engine, mobile);

    assert_eq!(engine.active_filter(), Some(&Filter::Category("mobile".into())));
    let visible = engine.visible_cards();
    assert_eq!(visible.len(), 2);
    for card in &visible {
        assert_eq!(engine.document().attribute(*card, "data-category").as_deref(), Some("mobile"));
    }
    let active = all(&engine, ".filter-btn.active");
    assert_eq!(active, [mobile]);

    let everything = first(&engine, "[data-filter=\"all\"]");
    click(&mut engine, everything);
    assert_eq!(engine.visible_cards().len(), 5);
}

#[test]
fn test_reveal_applies_once() {
    let mut engine = engine();
    let card = first(&engine, ".blog-card");
    engine.dispatch(UiEvent::Visibility {
        target: card,
        geometry: Geometry::fully_visible(),
    });
    assert_eq!(
        engine.document().style(card, "animation").as_deref(),
        Some("slideUp 0.6s ease forwards")
    );
}

// ============================================================================
// Counters
// ============================================================================

#[test]
fn test_counter_animates_to_target_and_stops() {
    let mut engine = engine();
    let label = all(&engine, ".stat h4")[1];
    assert_eq!(engine.document().text(label), "1200+ clients");

    engine.dispatch(UiEvent::Visibility {
        target: label,
        geometry: Geometry::fully_visible(),
    });
    assert_eq!(engine.document().text(label), "0+");
    assert_eq!(engine.active_timers(), 1);

    let mut last = 0;
    for _ in 0..20 {
        engine.advance(Duration::from_millis(100));
        let shown: u64 = engine.document().text(label).trim_end_matches('+').parse().unwrap();
        assert!(shown >= last);
        last = shown;
    }
    assert_eq!(engine.document().text(label), "1200+");
    assert_eq!(engine.active_timers(), 0);

    // No re-fire on later visibility changes
    engine.dispatch(UiEvent::Visibility {
        target: label,
        geometry: Geometry::fully_visible(),
    });
    engine.advance(Duration::from_secs(5));
    assert_eq!(engine.document().text(label), "1200+");
    assert_eq!(engine.active_timers(), 0);
}

#[test]
fn test_counters_run_concurrently() {
    let mut engine = engine();
    for label in all(&engine, ".stat h4") {
        engine.dispatch(UiEvent::Visibility {
            target: label,
            geometry: Geometry::fully_visible(),
        });
    }
    assert_eq!(engine.active_timers(), 3);
    engine.advance(Duration::from_millis(2000));
    let texts: Vec<String> = all(&engine, ".stat h4")
        .into_iter()
        .map(|n| engine.document().text(n))
        .collect();
    assert_eq!(texts, ["50+", "1200+", "8+"]);
    assert_eq!(engine.active_timers(), 0);
}

// ============================================================================
// Contact form
// ============================================================================

fn fill_valid(engine: &mut TestEngine) {
    type_into(engine, "name", "Ada Lovelace");
    type_into(engine, "email", "ada@example.com");
    type_into(engine, "subject", "Hello");
    type_into(engine, "message", "I would like to work together.");
}

#[test]
fn test_submit_bad_email_keeps_values() {
    let mut engine = engine();
    fill_valid(&mut engine);
    type_into(&mut engine, "email", "bad@");
    let terms = by_id(&engine, "terms");
    engine.document_mut().set_checked(terms, true);

    let form = by_id(&engine, "contactForm");
    let outcome = engine.dispatch(UiEvent::Submit { target: form });
    assert!(outcome.default_prevented);
    assert_eq!(
        outcome.submission,
        Some(SubmitOutcome::Invalid(vec![(Field::Email, FieldError::InvalidEmailFormat)]))
    );
    assert_eq!(engine.document().value(by_id(&engine, "name")), "Ada Lovelace");
    assert!(engine.document().alerts().is_empty());
}

#[test]
fn test_submit_without_terms_blocks_and_keeps_values() {
    let mut engine = engine();
    fill_valid(&mut engine);
    let form = by_id(&engine, "contactForm");
    let outcome = engine.dispatch(UiEvent::Submit { target: form });

    assert_eq!(outcome.submission, Some(SubmitOutcome::TermsNotAccepted));
    assert_eq!(engine.document().alerts(), ["Please agree to the terms and privacy policy"]);
    assert_eq!(engine.document().value(by_id(&engine, "subject")), "Hello");
}

#[test]
fn test_submit_success_resets_everything() {
    let mut engine = engine();
    fill_valid(&mut engine);
    let open = by_id(&engine, "termsBtn");
    let agree = by_id(&engine, "agreeTerms");
    click(&mut engine, open);
    click(&mut engine, agree);

    let form = by_id(&engine, "contactForm");
    let outcome = engine.dispatch(UiEvent::Submit { target: form });
    assert_eq!(outcome.submission, Some(SubmitOutcome::Submitted));
    assert_eq!(
        engine.document().alerts(),
        ["Thank you for your message! I will get back to you soon."]
    );
    for field in Field::ALL {
        assert_eq!(engine.document().value(by_id(&engine, field.as_str())), "");
    }
    for display in all(&engine, ".error-message") {
        assert_eq!(engine.document().text(display), "");
        assert!(!engine.document().has_class(display, "show"));
    }
}

#[test]
fn test_blur_only_validates_that_field() {
    let mut engine = engine();
    let subject = by_id(&engine, "subject");
    engine.dispatch(UiEvent::Blur { target: subject });
    assert_eq!(
        engine.field_status(Field::Subject).and_then(|s| s.error),
        Some(FieldError::RequiredFieldEmpty)
    );
    assert_eq!(engine.field_status(Field::Name).and_then(|s| s.error), None);
    assert_eq!(engine.document().text(by_id(&engine, "subjectError")), "This field is required");
}

// ============================================================================
// Read more
// ============================================================================

#[test]
fn test_read_more_swaps_panes() {
    let mut engine = engine();
    let trigger = first(&engine, ".read-more");
    let excerpt = first(&engine, ".blog-excerpt");
    let full = first(&engine, ".blog-full-content");

    for (round, expected) in [(1, ExpandState::Expanded), (2, ExpandState::Collapsed)] {
        let outcome = click(&mut engine, trigger);
        assert!(outcome.default_prevented);
        assert!(outcome.is_clean(), "round {}", round);
        assert_eq!(engine.expand_state(trigger), Some(expected));

        let doc = engine.document();
        let full_shown = doc.style(full, "display").as_deref() == Some("block");
        let excerpt_shown = doc.style(excerpt, "display").as_deref() == Some("block");
        assert_ne!(full_shown, excerpt_shown);
        assert_eq!(full_shown, expected == ExpandState::Expanded);
    }
    assert_eq!(engine.document().text(trigger), "Read More →");
}
