//! Server-side HTML rendering.
//!
//! The page is self-contained: inline stylesheet, inline script for the
//! toggle/delete calls. Descriptions are HTML-escaped before they reach
//! the store, so they are inserted verbatim here; everything else on the
//! page is static or service-generated.

use crate::http::flash::{Flash, FlashLevel};
use crate::store::{Task, TaskCounts, TaskFilter};

const STYLE: &str = r#"
  body { font-family: system-ui, sans-serif; max-width: 640px; margin: 2rem auto; padding: 0 1rem; color: #222; }
  h1 { font-size: 1.5rem; }
  .flash { padding: 0.6rem 1rem; border-radius: 4px; margin-bottom: 1rem; }
  .flash.success { background: #e6f4ea; color: #1e4620; }
  .flash.error { background: #fce8e6; color: #5f1411; }
  .add-form { display: flex; gap: 0.5rem; margin-bottom: 1rem; }
  .add-form input[type=text] { flex: 1; padding: 0.5rem; }
  .filters a { margin-right: 0.75rem; color: #555; text-decoration: none; }
  .filters a.current { color: #000; font-weight: 600; }
  ul.tasks { list-style: none; padding: 0; }
  li.task { display: flex; justify-content: space-between; align-items: center; padding: 0.5rem 0; border-bottom: 1px solid #eee; }
  li.task.completed .description { text-decoration: line-through; color: #888; }
  .actions button { margin-left: 0.5rem; }
  .empty { color: #777; }
"#;

const SCRIPT: &str = r#"
  const csrfToken = document.querySelector('input[name="csrf_token"]').value;
  async function postTask(path) {
    const res = await fetch(path, {
      method: 'POST',
      headers: { 'Content-Type': 'application/x-www-form-urlencoded' },
      body: 'csrf_token=' + encodeURIComponent(csrfToken)
    });
    if (res.ok) {
      window.location.reload();
    } else {
      const body = await res.json().catch(() => ({}));
      alert(body.error || 'Request failed');
    }
  }
  document.querySelectorAll('[data-toggle]').forEach(btn =>
    btn.addEventListener('click', () => postTask('/toggle_task/' + btn.dataset.toggle)));
  document.querySelectorAll('[data-delete]').forEach(btn =>
    btn.addEventListener('click', () => postTask('/delete_task/' + btn.dataset.delete)));
"#;

/// Render the main task listing page.
pub fn index_page(
    tasks: &[Task],
    filter: TaskFilter,
    counts: &TaskCounts,
    csrf_token: &str,
    flash: Option<&Flash>,
) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>To-Do</title>\n");
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<h1>To-Do</h1>\n");

    if let Some(flash) = flash {
        let class = match flash.level {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        };
        html.push_str(&format!(
            "<div class=\"flash {}\">{}</div>\n",
            class, flash.message
        ));
    }

    html.push_str("<form method=\"post\" action=\"/add_task\" class=\"add-form\">\n");
    html.push_str(
        "<input type=\"text\" name=\"description\" maxlength=\"500\" \
         placeholder=\"What needs doing?\" required>\n",
    );
    html.push_str(&format!(
        "<input type=\"hidden\" name=\"csrf_token\" value=\"{}\">\n",
        csrf_token
    ));
    html.push_str("<button type=\"submit\">Add</button>\n</form>\n");

    html.push_str("<nav class=\"filters\">\n");
    for (target, label, count) in [
        (TaskFilter::All, "All", counts.total),
        (TaskFilter::Active, "Active", counts.active),
        (TaskFilter::Completed, "Completed", counts.completed),
    ] {
        let current = if target == filter { " class=\"current\"" } else { "" };
        html.push_str(&format!(
            "<a href=\"/?filter={}\"{}>{} ({})</a>\n",
            target.as_str(),
            current,
            label,
            count
        ));
    }
    html.push_str("</nav>\n");

    if tasks.is_empty() {
        html.push_str("<p class=\"empty\">No tasks to show.</p>\n");
    } else {
        html.push_str("<ul class=\"tasks\">\n");
        for task in tasks {
            let class = if task.completed { "task completed" } else { "task" };
            html.push_str(&format!(
                "<li class=\"{}\"><span class=\"description\">{}</span>\
                 <span class=\"actions\">\
                 <button data-toggle=\"{}\">Toggle</button>\
                 <button data-delete=\"{}\">Delete</button>\
                 </span></li>\n",
                class, task.description, task.id, task.id
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

/// Render the fallback error page.
pub fn error_page(status: u16, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{status}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>{status}</h1>\n<p>{message}</p>\n<p><a href=\"/\">Back to tasks</a></p>\n\
         </body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;

    #[test]
    fn page_carries_form_token_and_tasks() {
        let store = TaskStore::new();
        store.add("water the &lt;plants&gt;".to_string());
        let tasks = store.list(TaskFilter::All);
        let counts = store.counts();

        let page = index_page(&tasks, TaskFilter::All, &counts, "TOKENTOKENTOKEN1", None);
        assert!(page.contains("name=\"csrf_token\" value=\"TOKENTOKENTOKEN1\""));
        assert!(page.contains("water the &lt;plants&gt;"));
        assert!(page.contains("All (1)"));
        assert!(page.contains("Active (1)"));
        assert!(page.contains("Completed (0)"));
    }

    #[test]
    fn flash_banner_is_rendered() {
        let counts = TaskCounts {
            total: 0,
            active: 0,
            completed: 0,
        };
        let flash = Flash::error("Invalid task description.");
        let page = index_page(&[], TaskFilter::All, &counts, "TOKENTOKENTOKEN1", Some(&flash));
        assert!(page.contains("class=\"flash error\""));
        assert!(page.contains("Invalid task description."));
    }

    #[test]
    fn empty_store_shows_placeholder() {
        let counts = TaskCounts {
            total: 0,
            active: 0,
            completed: 0,
        };
        let page = index_page(&[], TaskFilter::Active, &counts, "TOKENTOKENTOKEN1", None);
        assert!(page.contains("No tasks to show."));
        assert!(page.contains("href=\"/?filter=active\" class=\"current\""));
    }

    #[test]
    fn error_page_names_the_status() {
        let page = error_page(404, "Page not found");
        assert!(page.contains("404"));
        assert!(page.contains("Page not found"));
    }
}
