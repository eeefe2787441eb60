//! Scripted kanban board used as the built-in demo target.
//!
//! Reproduces the behavior of the kanban application the built-in suite was
//! written against, including its known defects: drag-and-drop never moves a
//! card and tag chips cannot be edited. Load and viewport changes take effect
//! after short delays, so scenarios must poll instead of assuming instant
//! state.

use std::time::Duration;

use super::backend::{Element, MockSurface, Tree};

/// Delay before the board becomes queryable after navigation
const DEMO_LOAD_DELAY: Duration = Duration::from_millis(120);

/// Delay before a viewport change is reported as in effect
const DEMO_VIEWPORT_SETTLE: Duration = Duration::from_millis(60);

/// Build the demo kanban surface with all interaction effects wired up
pub fn demo_kanban_surface() -> MockSurface {
    let mut tree = Tree::new();
    let root = tree.root();

    // Header with the favorite star
    let header = tree.append(root, Element::new("header").class("board-header"));
    tree.append(header, Element::new("h1").text("Kanban"));
    tree.append(header, Element::new("button").id("star").class("star"));

    // Board with the three columns
    let board = tree.append(root, Element::new("main").class("board"));

    let todo = tree.append(board, Element::new("section").class("column").class("todo-column"));
    tree.append(todo, Element::new("h2").text("To Do"));
    let todo_cards = tree.append(todo, Element::new("div").id("todo-cards").class("card-list"));
    add_card(&mut tree, todo_cards, "card-1", "Estudar Rust");
    add_card(&mut tree, todo_cards, "card-2", "Revisar PR");

    let progress = tree.append(
        board,
        Element::new("section").class("column").class("progress-column"),
    );
    tree.append(progress, Element::new("h2").text("In Progress"));
    let progress_cards =
        tree.append(progress, Element::new("div").id("progress-cards").class("card-list"));
    add_card(&mut tree, progress_cards, "card-3", "Escrever testes");

    let done = tree.append(board, Element::new("section").class("column").class("done-column"));
    tree.append(done, Element::new("h2").text("Done"));
    let done_cards = tree.append(done, Element::new("div").id("done-cards").class("card-list"));
    add_card(&mut tree, done_cards, "card-4", "Configurar CI");

    // Add-task form in the To Do column, hidden until requested
    tree.append(
        todo,
        Element::new("button").id("add-task").class("add-btn").text("Adicionar Tarefa"),
    );
    let form = tree.append(todo, Element::new("div").id("add-form").class("add-form").hidden());
    tree.append(
        form,
        Element::new("input").id("new-task-input").attr("placeholder", "Nova tarefa"),
    );
    tree.append(form, Element::new("button").id("confirm-add").text("Adicionar"));

    // Card detail modal, hidden until a card is opened
    let modal = tree.append(
        root,
        Element::new("div").id("task-detail").class("modal").class("task-detail").hidden(),
    );
    tree.append(modal, Element::new("input").id("edit-title").class("edit-input"));
    tree.append(modal, Element::new("button").id("save-title").text("Salvar"));
    tree.append(
        modal,
        Element::new("input").id("tag-input").class("tag-input").attr("placeholder", "tag"),
    );
    tree.append(modal, Element::new("div").id("tag-list").class("tag-list"));

    // Delete confirmation, hidden until a delete control is clicked
    tree.append(
        root,
        Element::new("button").id("confirm-delete").class("confirm-btn").text("Confirmar").hidden(),
    );

    let mut surface = MockSurface::with_tree(tree)
        .load_delay(DEMO_LOAD_DELAY)
        .viewport_settle_delay(DEMO_VIEWPORT_SETTLE);

    surface.on_click("star", |tree| {
        if let Some(star) = tree.find("star") {
            if tree.has_class(star, "active") {
                tree.remove_class(star, "active");
            } else {
                tree.add_class(star, "active");
            }
        }
    });

    surface.on_click("add-task", |tree| {
        if let Some(form) = tree.find("add-form") {
            tree.set_visible(form, true);
        }
    });

    surface.on_click("confirm-add", |tree| {
        let (Some(input), Some(cards)) = (tree.find("new-task-input"), tree.find("todo-cards"))
        else {
            return;
        };
        let title = tree.value(input);
        if title.trim().is_empty() {
            return;
        }
        let card_id = format!("card-new-{}", title.len());
        add_card(tree, cards, &card_id, title.trim());
        tree.set_attr(input, "value", "");
        if let Some(form) = tree.find("add-form") {
            tree.set_visible(form, false);
        }
    });

    // Card clicks open the detail modal pre-filled with the card title
    for card in ["card-1", "card-2", "card-3", "card-4"] {
        surface.on_click(card, move |tree| {
            let (Some(card_node), Some(modal), Some(edit)) =
                (tree.find(card), tree.find("task-detail"), tree.find("edit-title"))
            else {
                return;
            };
            let title = tree.snapshot(card_node).text;
            tree.set_visible(modal, true);
            tree.set_attr(edit, "value", title);
            tree.set_attr(modal, "data-card", card);
        });

        let delete_id = format!("delete-{}", card);
        surface.on_click(delete_id, move |tree| {
            if let Some(confirm) = tree.find("confirm-delete") {
                tree.set_visible(confirm, true);
                tree.set_attr(confirm, "data-card", card);
            }
        });
    }

    surface.on_click("confirm-delete", |tree| {
        let Some(confirm) = tree.find("confirm-delete") else {
            return;
        };
        let target = tree.snapshot(confirm).attribute("data-card").map(str::to_string);
        if let Some(card) = target.and_then(|id| tree.find(&id)) {
            tree.remove(card);
        }
        tree.set_visible(confirm, false);
    });

    surface.on_click("save-title", |tree| {
        let (Some(modal), Some(edit)) = (tree.find("task-detail"), tree.find("edit-title")) else {
            return;
        };
        let target = tree.snapshot(modal).attribute("data-card").map(str::to_string);
        let title = tree.value(edit);
        if let Some(card) = target.and_then(|id| tree.find(&id)) {
            if !title.trim().is_empty() {
                tree.set_text(card, title.trim());
            }
        }
    });

    // A trailing newline commits the tag, mirroring `{enter}` in the app
    surface.on_type("tag-input", |tree, text| {
        let Some(input) = tree.find("tag-input") else {
            return;
        };
        let committed = text.ends_with('\n');
        let value = tree.value(input) + text.trim_end_matches('\n');
        if committed {
            if let Some(list) = tree.find("tag-list") {
                if !value.is_empty() {
                    tree.append(list, Element::new("span").class("tag").text(&value));
                }
            }
            tree.set_attr(input, "value", "");
        } else {
            tree.set_attr(input, "value", value);
        }
    });

    // No drag handlers and no tag-chip click handlers: the board's known
    // defects are that cards never move between columns and tags cannot be
    // edited once created.

    surface
}

fn add_card(tree: &mut Tree, parent: crate::surface::ElementId, dom_id: &str, title: &str) {
    let card = tree.append(
        parent,
        Element::new("div").id(dom_id).class("task-card").text(title),
    );
    tree.append(
        card,
        Element::new("button")
            .id(format!("delete-{}", dom_id))
            .class("delete-btn")
            .attr("title", "excluir"),
    );
}
