//! Single-page chat view.
//!
//! The page is a static shell; turns are fetched as JSON and inserted with
//! `textContent`, so model output is never interpreted as HTML.

/// Page heading and `<title>`.
pub const APP_TITLE: &str = "Cybersecurity AI Assistant";

const STYLE: &str = r"
:root { color-scheme: dark; }
body { margin: 0; font-family: system-ui, sans-serif; background: #0f172a; color: #f8fafc; }
.wrap { max-width: 1100px; margin: 0 auto; padding: 1.5rem; }
h2 { font-weight: 600; margin: 0 0 1rem; }
#scrollback { height: 70vh; overflow-y: auto; background: #1e293b; border-radius: 1rem; padding: 1rem; }
.turn { margin-bottom: 1rem; }
.bubble { white-space: pre-wrap; padding: .75rem 1rem; border-radius: .75rem; max-width: 80%; }
.user { background: #2563eb; margin-left: auto; }
.bot { background: #334155; margin-top: .5rem; }
.bot.pending { opacity: .6; font-style: italic; }
.controls { display: flex; gap: 12px; align-items: center; margin-top: 1rem; }
textarea { flex: 8; resize: none; background: #1e293b; color: inherit; border: 1px solid #334155; border-radius: .75rem; padding: .75rem; font: inherit; }
button { flex: 2; height: 3rem; border: 0; border-radius: .75rem; background: #2563eb; color: #fff; font-weight: 600; cursor: pointer; }
button:disabled { opacity: .5; cursor: not-allowed; }
";

const SCRIPT: &str = r"
const scrollback = document.getElementById('scrollback');
const form = document.getElementById('chat-form');
const input = form.querySelector('[name=message]');
const send = form.querySelector('button');
const chat = { sessionId: null, turns: [], pending: false };

function bubble(cls, text) {
  const div = document.createElement('div');
  div.className = 'bubble ' + cls;
  div.textContent = text;
  return div;
}

function render() {
  scrollback.replaceChildren(...chat.turns.map((turn) => {
    const row = document.createElement('div');
    row.className = 'turn';
    row.appendChild(bubble('user', turn.question));
    row.appendChild(turn.answer === null
      ? bubble('bot pending', 'Thinking…')
      : bubble('bot', turn.answer));
    return row;
  }));
  scrollback.scrollTop = scrollback.scrollHeight;
}

function setPending(pending) {
  chat.pending = pending;
  send.disabled = pending;
}

async function postJson(url, body) {
  return fetch(url, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
}

async function refresh() {
  if (!chat.sessionId) return;
  try {
    const res = await fetch(`/api/sessions/${encodeURIComponent(chat.sessionId)}/turns`);
    if (!res.ok) return;
    chat.turns = await res.json();
    render();
  } catch (_) {
    // keep the last rendered scrollback
  }
}

async function submitMessage() {
  if (chat.pending) return;
  const message = input.value;
  input.value = '';

  setPending(true);
  try {
    const res = await postJson('/api/chat', { message, session_id: chat.sessionId });
    if (!res.ok) return;
    const out = await res.json();
    chat.sessionId = out.session_id ?? chat.sessionId;
    chat.turns = out.turns;
    render();
    if (!out.accepted) return;

    const reply = await postJson('/api/chat/respond', { session_id: chat.sessionId });
    if (reply.ok) {
      const update = await reply.json();
      chat.turns[update.turn_index] = update.turn;
      render();
    } else {
      await refresh();
    }
  } catch (_) {
    await refresh();
  } finally {
    setPending(false);
  }
}

form.addEventListener('submit', (event) => {
  event.preventDefault();
  submitMessage();
});

input.addEventListener('keydown', (event) => {
  if (event.key === 'Enter' && !event.shiftKey) {
    event.preventDefault();
    submitMessage();
  }
});
";

/// Render the complete chat page.
#[must_use]
pub fn chat_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Beginner-friendly cybersecurity Q&amp;A">
    <title>{APP_TITLE}</title>
    <style>{STYLE}</style>
</head>
<body>
    <main class="wrap">
        <h2>{APP_TITLE}</h2>
        <div id="scrollback" aria-live="polite" aria-label="Chat messages"></div>
        <form id="chat-form" class="controls">
            <textarea name="message" rows="2" placeholder="Type your cybersecurity question..."></textarea>
            <button type="submit">Send</button>
        </form>
    </main>
    <script>{SCRIPT}</script>
</body>
</html>"#
    )
}
