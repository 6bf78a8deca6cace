//! Server-rendered control panel
//!
//! All dynamic text is spliced through `maud`, which escapes it; log entries
//! in particular carry raw backend output. After the first render the page
//! follows `/events` and patches itself with `textContent`, so the seconds
//! inputs keep whatever the user typed.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::state::{ConnectionState, PanelSnapshot, SlotSnapshot};

/// Seconds prefilled into a slot that has never been armed
const DEFAULT_SECONDS: u64 = 1;

const STYLE: &str = "
body { font-family: sans-serif; margin: 2em; }
.slot { display: flex; gap: 0.5em; align-items: center; margin-bottom: 0.5em; }
.status { min-width: 12em; font-family: monospace; }
#output p { margin: 0.2em 0; word-wrap: break-word; }
#output .response { color: blue; }
#output .error { color: red; }
";

const SCRIPT: &str = r#"
const connectionLabels = { connecting: "connecting", open: "connected", closed: "disconnected" };

const events = new EventSource("/events");
events.onmessage = (message) => {
    const panel = JSON.parse(message.data);
    document.getElementById("connection").textContent = connectionLabels[panel.connection];
    for (const slot of panel.slots) {
        document.getElementById("demo" + slot.id).textContent = slot.status;
        document.getElementById("set" + slot.id).disabled = !slot.set_enabled;
    }
    document.getElementById("output").replaceChildren(...panel.log.map((entry) => {
        const line = document.createElement("p");
        line.className = entry.style;
        line.textContent = entry.text;
        return line;
    }));
};

for (const form of document.querySelectorAll("form.slot")) {
    form.addEventListener("submit", (event) => {
        event.preventDefault();
        const action = event.submitter ? event.submitter.formAction : form.action;
        fetch(action, { method: "POST", body: new URLSearchParams(new FormData(form)) });
    });
}
"#;

fn connection_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Connecting => "connecting",
        ConnectionState::Open => "connected",
        ConnectionState::Closed => "disconnected",
    }
}

/// Render the full panel page
pub fn render_panel(snapshot: &PanelSnapshot) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Timer Panel" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { "Timers" }
                p {
                    "Backend " (snapshot.backend) ": "
                    span id="connection" { (connection_label(snapshot.connection)) }
                }
                @for slot in &snapshot.slots {
                    (render_slot(slot))
                }
                div id="output" {
                    @for entry in &snapshot.log {
                        p class=(entry.style.css_class()) { (entry.text) }
                    }
                }
                script { (PreEscaped(SCRIPT)) }
            }
        }
    }
}

fn render_slot(slot: &SlotSnapshot) -> Markup {
    let i = slot.id.index();
    html! {
        form class="slot" method="post" action={ "/slots/" (i) "/set" } {
            label for={ "seconds" (i) } { "Timer " (i) }
            input type="number" id={ "seconds" (i) } name="seconds" min="0"
                value=(slot.seconds.unwrap_or(DEFAULT_SECONDS));
            button id={ "set" (i) } type="submit" disabled[!slot.set_enabled] { "set" }
            button id={ "cancel" (i) } type="submit"
                formaction={ "/slots/" (i) "/cancel" } formnovalidate { "cancel" }
            button id={ "reset" (i) } type="submit"
                formaction={ "/slots/" (i) "/reset" } { "reset" }
            span class="status" id={ "demo" (i) } { (slot.status.to_string()) }
        }
    }
}
