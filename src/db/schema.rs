pub const SCHEMA: &str = r#"
-- content table (carousel seed documents)
CREATE TABLE IF NOT EXISTS content (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    markdown TEXT NOT NULL
);

-- search_history table
CREATE TABLE IF NOT EXISTS search_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    keyword TEXT NOT NULL UNIQUE,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_search_history_timestamp ON search_history(timestamp DESC);

-- view_history table
CREATE TABLE IF NOT EXISTS view_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    title TEXT NOT NULL,
    image TEXT,
    teaser TEXT,
    timestamp INTEGER NOT NULL,
    date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_view_history_timestamp ON view_history(timestamp DESC);
"#;

/// Applied after the schema transaction so legacy duplicate labels cannot
/// fail initialization.
pub const VIEW_LABEL_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_view_history_label ON view_history(label);";

/// Inserted in order when the content table is empty.
pub const SEED_CONTENT: [&str; 3] = [
    r#"# Welcome to Explore

This is the **first** content item with *markdown* formatting.

## Features

- Swipe left or right to navigate
- Markdown support
- SQLite storage

### Links

Visit [React Native](https://reactnative.dev) for more info."#,
    r#"# Second Item

This is the **second** piece of content.

## Highlights

1. Numbered lists
2. Bold and *italic* text
3. Multiple heading levels

### More Info

Check out this [link](https://expo.dev) for details."#,
    r#"# Third Content

Welcome to the **third** and *final* item!

## Summary

- Three items total
- Swipe to explore
- Markdown rendering

Visit [GitHub](https://github.com) to learn more."#,
];
