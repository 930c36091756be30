//! Server-side HTML for the dashboard page.

use printwatch_core::models::SessionUser;
use printwatch_core::snapshot::Snapshot;
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7f9; color: #1d232a; }
main { max-width: 1100px; margin: 0 auto; padding: 20px 16px 40px; }
header { display: flex; justify-content: space-between; align-items: baseline; }
.kpis { display: grid; grid-template-columns: repeat(4, 1fr); gap: 12px; margin: 18px 0; }
.kpi { border-radius: 16px; padding: 14px 16px; border: 1px solid rgba(0,0,0,0.08); background: #fff; }
.kpi h3 { margin: 0 0 8px 0; font-size: 0.95rem; opacity: 0.85; }
.kpi .v { font-size: 1.6rem; font-weight: 700; }
.box { border: 1px solid rgba(0,0,0,0.08); border-radius: 16px; padding: 16px; background: #fff; margin-bottom: 16px; }
.row { display: flex; gap: 8px; flex-wrap: wrap; }
.row input, .row select { flex: 1; padding: 8px; border: 1px solid #ccd; border-radius: 8px; }
button { padding: 8px 14px; border: 0; border-radius: 8px; background: #1f6feb; color: #fff; cursor: pointer; }
button.danger { background: #c9372c; }
button:disabled { opacity: 0.45; cursor: not-allowed; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { text-align: left; padding: 8px 10px; border-bottom: 1px solid #eee; }
thead tr th { text-transform: uppercase; font-size: 0.8rem; letter-spacing: .03em; }
.msg { min-height: 1.2em; font-size: 0.9rem; margin-top: 8px; }
.caption { opacity: 0.7; font-size: 0.85rem; }
"#;

const SCRIPT: &str = r#"
(function () {
  const interval = Number(document.body.dataset.refreshMs);
  const msg = document.getElementById('msg');

  function scheduleReload() {
    setTimeout(function () {
      const el = document.activeElement;
      if (el && (el.tagName === 'INPUT' || el.tagName === 'SELECT')) {
        scheduleReload();
      } else {
        window.location.reload();
      }
    }, interval);
  }
  scheduleReload();

  async function send(method, url, body) {
    const opts = { method: method, headers: { 'Content-Type': 'application/json' } };
    if (body !== undefined) opts.body = JSON.stringify(body);
    const resp = await fetch(url, opts);
    const data = await resp.json().catch(function () { return {}; });
    if (!resp.ok) {
      msg.textContent = data.error || ('Erro ' + resp.status);
      return;
    }
    window.location.reload();
  }

  const add = document.getElementById('add');
  if (add) add.addEventListener('click', function () {
    send('POST', '/api/printers', {
      ip: document.getElementById('ip').value,
      setor: document.getElementById('setor').value,
    });
  });

  const remove = document.getElementById('remove');
  if (remove) remove.addEventListener('click', function () {
    const entry = document.getElementById('entry').value;
    if (entry) send('POST', '/api/printers/remove', { entry: entry });
  });

  const clear = document.getElementById('clear');
  if (clear) clear.addEventListener('click', function () {
    if (window.confirm('Esvaziar a lista de impressoras?')) send('DELETE', '/api/printers');
  });
})();
"#;

pub struct DashboardView<'a> {
    pub snapshot: &'a Snapshot,
    pub entries: &'a [String],
    pub user: Option<&'a SessionUser>,
    pub query: &'a str,
    pub refresh_ms: u64,
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn dashboard(view: &DashboardView<'_>) -> String {
    let is_admin = view.user.map(SessionUser::is_admin).unwrap_or(false);
    let disabled = if is_admin { "" } else { " disabled" };
    let snap = view.snapshot;
    let mut html = String::with_capacity(8 * 1024);

    // write! on a String cannot fail
    let _ = write!(
        html,
        r#"<!doctype html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Monitor de Impressoras</title>
<style>{STYLE}</style>
</head>
<body data-refresh-ms="{refresh}">
<main>
<header>
<div><h1>🖨️ Monitor de Impressoras — Ping ICMP</h1>
<div class="caption">Ping periódico • somente admin pode editar a lista</div></div>
<div class="caption">{who}</div>
</header>
"#,
        refresh = view.refresh_ms,
        who = match view.user {
            Some(u) => format!("{} ({})", escape_html(&u.name), if u.is_admin() { "admin" } else { "leitura" }),
            None => "Modo leitura".to_string(),
        },
    );

    // Cadastro
    let _ = write!(
        html,
        r#"<section class="box"><h2>Cadastro de Impressoras</h2>
<div class="row">
<input id="ip" placeholder="Ex.: 192.168.1.50"{disabled}>
<input id="setor" placeholder="Ex.: Almoxarifado"{disabled}>
<button id="add"{disabled}>➕ Adicionar</button>
<button id="clear" class="danger"{disabled}>🗑️ Limpar lista</button>
</div>
"#
    );
    if !view.entries.is_empty() {
        let _ = write!(
            html,
            r#"<div class="row" style="margin-top:8px"><select id="entry"{disabled}><option value="">(selecionar)</option>"#
        );
        for entry in view.entries {
            let e = escape_html(entry);
            let _ = write!(html, r#"<option value="{e}">{e}</option>"#);
        }
        let _ = write!(html, r#"</select><button id="remove"{disabled}>Remover</button></div>"#);
    }
    html.push_str(r#"<div class="msg" id="msg"></div></section>"#);

    if snap.idle {
        html.push_str(r#"<section class="box">Nenhuma impressora cadastrada.</section>"#);
    } else {
        let _ = write!(
            html,
            r#"<section class="kpis">
<div class="kpi"><h3>Ativas (UP)</h3><div class="v">{up}</div></div>
<div class="kpi"><h3>Inativas (DOWN)</h3><div class="v">{down}</div></div>
<div class="kpi"><h3>Total</h3><div class="v">{total}</div></div>
<div class="kpi"><h3>Última checagem</h3><div class="v" style="font-size:1rem">{at}</div></div>
</section>
"#,
            up = snap.up,
            down = snap.down,
            total = snap.total,
            at = escape_html(snap.checked_at.as_deref().unwrap_or("-")),
        );

        let q = escape_html(view.query);
        let _ = write!(
            html,
            r#"<section class="box"><h2>Impressoras</h2>
<div class="row">
<form class="row" style="flex:1" method="get" action="/">
<input name="q" value="{q}" placeholder="Filtrar por IP ou setor">
<button type="submit">Filtrar</button>
</form>
<form method="get" action="/export.csv">
<input type="hidden" name="q" value="{q}">
<button type="submit">⬇️ Exportar CSV</button>
</form>
</div>
<table><thead><tr><th>IP</th><th>Setor</th><th>Status</th><th>Checado às</th></tr></thead><tbody>
"#
        );
        for row in &snap.rows {
            let status = if row.reachable { "🟢 Online" } else { "🔴 Offline" };
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&row.ip),
                escape_html(&row.label),
                status,
                escape_html(&row.checked_at),
            );
        }
        html.push_str("</tbody></table></section>");
    }

    let _ = write!(
        html,
        r#"<p class="caption">Somente o admin pode adicionar/remover. Outros acessos ficam em modo leitura.</p>
</main>
<script>{SCRIPT}</script>
</body>
</html>
"#
    );
    html
}
