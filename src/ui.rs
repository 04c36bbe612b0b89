use crate::models::CalendarResponse;
use std::fmt::Write;

pub fn render_index(calendar: &CalendarResponse, panel_width: i32) -> String {
    let geometry = &calendar.geometry;
    let panel_width = panel_width.max(geometry.grid_width());
    let left = geometry.left_arrow();
    let right = geometry.right_arrow(panel_width);
    let panel_height = geometry.grid_bottom() + geometry.cell_margin;

    let mut grid = String::new();
    for (column, label) in calendar.day_labels.iter().enumerate() {
        let rect = geometry.label_rect(column as u32);
        let _ = write!(
            grid,
            r#"<span class="label" style="left:{}px;top:{}px;width:{}px;height:{}px">{}</span>"#,
            rect.x, rect.y, rect.width, rect.height, label
        );
    }
    for cell in &calendar.cells {
        let (Some(date), Some(color)) = (&cell.date, &cell.color) else {
            continue;
        };
        let _ = write!(
            grid,
            r#"<div class="cell" data-date="{date}" title="{date}: {count} plays" style="left:{x}px;top:{y}px;width:{w}px;height:{h}px;background:{color}"></div>"#,
            count = cell.count,
            x = cell.rect.x,
            y = cell.rect.y,
            w = cell.rect.width,
            h = cell.rect.height,
            color = escape(color),
        );
    }

    let summary = &calendar.summary;
    let busiest = summary
        .busiest_day
        .as_ref()
        .map(|day| format!("{} ({} plays)", day.date, day.count))
        .unwrap_or_else(|| "none".to_string());

    INDEX_HTML
        .replace("{{TITLE}}", &escape(&calendar.title))
        .replace("{{WIDTH}}", &panel_width.to_string())
        .replace("{{HEIGHT}}", &panel_height.to_string())
        .replace("{{HEADER}}", &geometry.header_height.to_string())
        .replace("{{ARROW}}", &geometry.arrow_size.to_string())
        .replace("{{LEFT_X}}", &left.x.to_string())
        .replace("{{RIGHT_X}}", &right.x.to_string())
        .replace("{{ARROW_Y}}", &left.y.to_string())
        .replace("{{GRID}}", &grid)
        .replace("{{TOTAL}}", &summary.total_plays.to_string())
        .replace("{{ACTIVE}}", &summary.active_days.to_string())
        .replace("{{BUSIEST}}", &escape(&busiest))
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} · Play Calendar</title>
  <style>
    body {
      margin: 0;
      padding: 24px;
      font-family: "Segoe UI", sans-serif;
      color: #24292e;
      background: #ffffff;
    }

    .panel {
      position: relative;
      width: {{WIDTH}}px;
      height: {{HEIGHT}}px;
      background: #f6f8fa;
    }

    .title {
      position: absolute;
      left: 0;
      right: 0;
      top: 0;
      height: {{HEADER}}px;
      line-height: {{HEADER}}px;
      text-align: center;
      font-weight: 600;
      font-size: 14px;
    }

    .arrow {
      position: absolute;
      top: {{ARROW_Y}}px;
      margin: 0;
    }

    .arrow button {
      width: {{ARROW}}px;
      height: {{ARROW}}px;
      padding: 0;
      border: none;
      background: transparent;
      cursor: pointer;
      font-size: 12px;
    }

    .label {
      position: absolute;
      font-size: 9px;
      color: #586069;
      text-align: center;
    }

    .cell {
      position: absolute;
      box-sizing: border-box;
    }

    .cell.hover {
      outline: 1px solid #000000;
    }

    .tooltip {
      position: absolute;
      display: none;
      width: 200px;
      padding: 5px 10px;
      background: #ffffff;
      border: 1px solid #cccccc;
      z-index: 2;
    }

    .tooltip strong {
      display: block;
      font-size: 11px;
    }

    .tooltip span {
      font-size: 10px;
      color: #586069;
    }

    .summary {
      margin-top: 16px;
      font-size: 12px;
      color: #586069;
    }
  </style>
</head>
<body>
  <div class="panel" id="panel">
    <form class="arrow" method="post" action="/nav/prev" style="left:{{LEFT_X}}px">
      <button type="submit" aria-label="Previous month">&#9664;</button>
    </form>
    <div class="title">{{TITLE}}</div>
    <form class="arrow" method="post" action="/nav/next" style="left:{{RIGHT_X}}px">
      <button type="submit" aria-label="Next month">&#9654;</button>
    </form>
    {{GRID}}
    <div class="tooltip" id="tooltip"><strong></strong><span></span></div>
  </div>
  <p class="summary">{{TOTAL}} plays on {{ACTIVE}} days · busiest: {{BUSIEST}}</p>

  <script>
    const panel = document.getElementById("panel");
    const tooltip = document.getElementById("tooltip");
    let hovered = null;

    const clearHover = () => {
      if (hovered) hovered.classList.remove("hover");
      hovered = null;
      tooltip.style.display = "none";
    };

    panel.addEventListener("mousemove", async (event) => {
      const bounds = panel.getBoundingClientRect();
      const x = Math.floor(event.clientX - bounds.left);
      const y = Math.floor(event.clientY - bounds.top);
      const res = await fetch(`/api/cell?x=${x}&y=${y}`);
      const cell = res.ok ? await res.json() : null;
      if (!cell || !cell.date) {
        clearHover();
        return;
      }
      const node = panel.querySelector(`[data-date="${cell.date}"]`);
      if (node !== hovered) {
        clearHover();
        hovered = node;
        if (hovered) hovered.classList.add("hover");
      }
      tooltip.querySelector("strong").textContent = cell.date;
      tooltip.querySelector("span").textContent = `${cell.count} plays`;
      tooltip.style.left = `${Math.min(cell.rect.x, bounds.width - 205)}px`;
      tooltip.style.top = `${cell.rect.y + cell.rect.height + 5}px`;
      tooltip.style.display = "block";
    });

    panel.addEventListener("mouseleave", clearHover);
  </script>
</body>
</html>
"#;
