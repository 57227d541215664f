//! Plain-text rendering of navigation views
//!
//! Produces what the CLI prints for each level: a heading, then either the
//! selectable child labels with the token that selects each, or the dishes of
//! a course.

use std::fmt::Write;

use crate::navigation::View;

/// Shown in place of an empty description
pub const NO_DESCRIPTION: &str = "no description";

/// Renders a view as a block of text
pub fn render_view(view: &View) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_view(&mut out, view);
    out
}

fn write_view(out: &mut String, view: &View) -> std::fmt::Result {
    let date = view.date();
    match view {
        View::Root { menu, .. } => {
            writeln!(out, "Menu for {}", date)?;
            if menu.is_empty() {
                writeln!(out, "  No menu is posted for this day.")?;
            }
            write_children(out, view)
        }
        View::Meal { meal, .. } => {
            writeln!(out, "Courses for {}'s {}", date, meal.label.to_lowercase())?;
            write_children(out, view)
        }
        View::Course {
            meal_label, course, ..
        } => {
            writeln!(
                out,
                "{} menu for {}'s {}",
                course.label.to_lowercase(),
                date,
                meal_label.to_lowercase()
            )?;
            for item in &course.items {
                let description = if item.description.is_empty() {
                    NO_DESCRIPTION
                } else {
                    item.description.as_str()
                };
                writeln!(out, "- {} - {}", item.name, description)?;
            }
            Ok(())
        }
    }
}

fn write_children(out: &mut String, view: &View) -> std::fmt::Result {
    for label in view.children() {
        let token = view.child_token(label).unwrap_or_default();
        writeln!(out, "  {:<24} {}", label.to_lowercase(), token)?;
    }
    Ok(())
}
