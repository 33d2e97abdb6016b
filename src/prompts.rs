//! Instruction payloads sent to the generation backend

use chrono::{Local, NaiveDate};

/// Ask for a single trending listed company, answered as `Name (TICKER)`.
pub fn recommendation() -> String {
    "You are a market-trend scout. Name exactly one listed company that \
     prominent investors or major financial institutions mentioned in the \
     last 10 hours and that is now widely discussed on Reddit investing \
     communities or social media. If nothing qualifies with confidence, pick \
     the most volatile, most discussed technology stock right now.\n\
     Reply with the company name and ticker only, for example: Tesla (TSLA)."
        .to_string()
}

/// Ask for the full article about `topic`, dated today.
pub fn article(topic: &str) -> String {
    article_on(topic, Local::now().date_naive())
}

/// Article payload for a fixed date.
pub fn article_on(topic: &str, date: NaiveDate) -> String {
    format!(
        r#"You are a value-investing analyst with twenty years of experience, known as a prudent contrarian.
Write a high-quality, professional blog post about: "{topic}".

Audience: serious individual investors looking for depth, not quick wins.
Tone: analytical and objective, authoritative yet humble, easy to follow.
Format: an HTML fragment only (no <html>, <head> or <body>), styled with inline CSS so it renders well on Blogger.

Structure:
1. Exactly one <h1> containing an accurate, search-friendly title.
2. An introduction that sets out the context.
3. Deep analysis: business quality and moat, balance-sheet health, and best/base/worst scenarios.
4. A "devil's advocate" section arguing against your own thesis.
5. An HTML table summarising key metrics or pros and cons, and a highlighted key-takeaways box.
6. A conclusion with a clear stance (attractive, neutral or overvalued).
7. At the very end, 5-10 comma-separated tags inside <div id="tags" style="display:none">tag1, tag2</div>.

Topic: {topic}
Date: {date}"#,
        date = date.format("%Y-%m-%d"),
    )
}
