use resto_core::{DocId, SearchEngine};

const COL_WIDTH: usize = 25;

/// Renders result rows as a fixed-width table. Rows carry a score only in
/// ranked and boosted modes.
pub fn render(engine: &SearchEngine, rows: &[(DocId, Option<f32>)]) -> String {
    let scored = rows.iter().any(|(_, s)| s.is_some());
    let mut headers = vec!["Restaurant Name", "Address", "Description", "Website"];
    if scored {
        headers.push("Score");
    }

    let mut out = String::new();
    let rule = format!("+{}+\n", vec!["-".repeat(COL_WIDTH + 2); headers.len()].join("+"));
    out.push_str(&rule);
    push_row(&mut out, headers.iter().map(|h| h.to_string()).collect());
    out.push_str(&rule);
    for (doc_id, score) in rows {
        let Some(rec) = engine.record(*doc_id) else { continue };
        let mut cells = vec![
            rec.name.clone(),
            rec.address.clone().unwrap_or_default(),
            preview(&rec.description),
            rec.website.clone().unwrap_or_default(),
        ];
        if scored {
            cells.push(score.map(|s| format!("{s:.4}")).unwrap_or_default());
        }
        push_row(&mut out, cells);
    }
    out.push_str(&rule);
    out
}

/// First 47 characters plus "..." for descriptions longer than 30 characters.
pub fn preview(description: &str) -> String {
    if description.chars().count() > 30 {
        let head: String = description.chars().take(47).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

fn push_row(out: &mut String, cells: Vec<String>) {
    out.push('|');
    for cell in cells {
        let clipped: String = cell.chars().take(COL_WIDTH).collect();
        out.push_str(&format!(" {:<width$} |", clipped, width = COL_WIDTH));
    }
    out.push('\n');
}
