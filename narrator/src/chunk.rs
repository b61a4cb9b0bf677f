use std::io::{Read, Write};
use std::path::Path;

use chunker::{ChunkBudget, Chunks, TextStats};

/// Read a script from `file`, or stdin when `None`
pub fn read_script(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read script {}: {e}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| anyhow::anyhow!("failed to read script from stdin: {e}"))?;
            Ok(text)
        }
    }
}

/// Write every chunk of `text` followed by a summary line
pub fn render(text: &str, budget: ChunkBudget, out: &mut impl Write) -> anyhow::Result<()> {
    let mut chunks = Chunks::new(text, budget);
    let mut parts = 0;

    for (index, cut) in std::iter::from_fn(|| chunks.next_cut()).enumerate() {
        parts += 1;
        writeln!(
            out,
            "--- Part {} ({} chars, {:?}) ---",
            index + 1,
            cut.text.encode_utf16().count(),
            cut.strategy
        )?;
        writeln!(out, "{}", cut.text)?;
    }

    let stats = TextStats::estimate(text);
    writeln!(
        out,
        "{parts} part(s), {} chars, {} words, ~{:.1} min",
        stats.chars, stats.words, stats.estimated_minutes
    )?;

    Ok(())
}
