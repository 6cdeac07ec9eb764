use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; background: #f9fafb; }
header { display: flex; align-items: center; gap: 2rem; padding: 0.75rem 1.5rem; background: #fff; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
header nav ul { display: flex; gap: 1rem; list-style: none; margin: 0; padding: 0; }
header a { color: #524ed2; text-decoration: none; }
main.container { max-width: 1100px; margin: 2rem auto; padding: 0 1rem; }
.card { background: #fff; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1.5rem; box-shadow: 0 1px 2px rgba(0,0,0,.06); }
.kpis { display: flex; gap: 1rem; flex-wrap: wrap; }
.kpi { flex: 1; min-width: 180px; }
.kpi .value { font-size: 1.6rem; font-weight: 600; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 8px; border-bottom: 1px solid #f3f4f6; text-align: left; }
td.num, th.num { text-align: right; }
pre.sql { background: #f4f4f4; padding: 0.75rem; border-radius: 6px; overflow-x: auto; }
.notice { padding: 0.75rem 1rem; border-radius: 6px; margin: 0.5rem 0; }
.notice.error { background: #fef2f2; color: #991b1b; }
.caption { color: #6b7280; font-size: 0.9rem; }
form.filters { display: flex; gap: 0.75rem; align-items: end; flex-wrap: wrap; }
"#;

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " | Hotel KPI Dashboard" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                header {
                    h3 { "Hotel KPI Dashboard" }
                    nav {
                        ul {
                            li { a href="/" { "City Dashboard" } }
                            li { a href="/metrics" { "Metrics" } }
                            li { a href="/assistant" { "SQL Assistant" } }
                        }
                    }
                }
                (content)
            }
        }
    }
}
