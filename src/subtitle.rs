use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::Result;
use crate::timing::Cue;

/// Style and script declarations preceding the dialogue events.
///
/// The transcoding engine's subtitle filter consumes this document as-is,
/// so the layout is fixed: script info, V4+ styles, then one Dialogue line
/// per cue.
const ASS_HEADER: &str = r#"[Script Info]
Title: Katari Narration
Original Script: katari
ScriptType: v4.00+
Collisions: Normal
PlayDepth: 0

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Hack Nerd Font Propo,12,&H33ffffff,&H00000000,&H00000000,&H88000000,1,0,4,1.0,0.0,2,10,10,10,1
Style: Highlighted,Arial,12,&H00FFFF00,&H00000000,&H00000000,&H80000000,1,1,1,2.0,1.0,2,20,20,10,1

[Events]
Format: Marked, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
"#;

/// Render a cue sheet into an ASS subtitle document.
///
/// One `Dialogue` line per cue, in cue order; cues are never merged or
/// reordered here.
pub fn render(cues: &[Cue]) -> String {
    let mut document = String::from(ASS_HEADER);
    for cue in cues {
        // An interior newline would terminate the Dialogue event early;
        // \N is the ASS line break
        let text = cue.text.replace("\r\n", "\\N").replace('\n', "\\N");
        document.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            cue.start_timestamp(),
            cue.end_timestamp(),
            text
        ));
    }
    document
}

/// Generate an ASS subtitle file from a cue sheet
pub async fn write_ass<P: AsRef<Path>>(cues: &[Cue], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating ASS file: {}", output_path.display());

    fs::write(output_path, render(cues)).await?;

    info!("ASS file generated successfully");
    Ok(())
}
