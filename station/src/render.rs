//! Derived-artifact renderer: the elevation chart and the static HTML
//! pages (passes, gallery, per-pass, settings).
//!
//! A pure I/O leaf: takes the plan, the gallery listing, and the selection
//! set, writes files under the base directory. No business logic; live
//! state reaches the pages through `current.json`/`selection.json` polling
//! and the HTTP API.

use crate::config::Settings;
use crate::gallery::GalleryPass;
use crate::i18n::Catalog;
use pass_scheduler::planner::Plan;
use pass_scheduler::LocalZone;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

const CHART_FILE: &str = "elevations.png";

fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn chart_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow::anyhow!("chart render: {}", e)
}

/// Bar chart of planned passes: one bar per pass, labeled with the local
/// rise time and satellite name.
pub fn render_chart(path: &Path, plan: &Plan, zone: &LocalZone) -> anyhow::Result<()> {
    use plotters::prelude::*;

    let root = BitMapBackend::new(path, (1200, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    if plan.windows.is_empty() {
        root.titled("No planned passes", ("sans-serif", 24))
            .map_err(chart_err)?;
        root.present().map_err(chart_err)?;
        return Ok(());
    }

    let n = plan.windows.len();
    let y_max = plan
        .windows
        .iter()
        .map(|w| w.max_elev_deg)
        .fold(0.0_f64, f64::max)
        + 10.0;
    let labels: Vec<String> = plan
        .windows
        .iter()
        .map(|w| {
            format!(
                "{} {}",
                zone.to_local(w.t_rise).format("%H:%M"),
                w.sat_name
            )
        })
        .collect();

    let mut chart = ChartBuilder::on(&root)
        .caption("Pass start times and max elevation", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(140)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n as f64, 0f64..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| {
            labels
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_desc("Max elevation (deg)")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(plan.windows.iter().enumerate().map(|(i, w)| {
            Rectangle::new(
                [(i as f64 + 0.2, 0.0), (i as f64 + 0.8, w.max_elev_deg)],
                BLUE.filled(),
            )
        }))
        .map_err(chart_err)?;

    chart
        .draw_series(plan.windows.iter().enumerate().map(|(i, w)| {
            Text::new(
                format!("{:.1}", w.max_elev_deg),
                (i as f64 + 0.25, w.max_elev_deg + 1.0),
                ("sans-serif", 13),
            )
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

fn nav(catalog: &Catalog, lang: &str, active: &str) -> String {
    let link = |href: &str, label: &str, key: &str| {
        format!(
            "<a class=\"navlink{}\" href=\"{}\">{}</a>",
            if active == key { " active" } else { "" },
            href,
            label
        )
    };
    let lang_link = |code: &str| {
        format!(
            "<a class=\"lang{}\" href=\"/api/lang?code={}\">{}</a>",
            if lang == code { " active" } else { "" },
            code,
            code.to_uppercase()
        )
    };
    format!(
        "<div class=\"navbar\"><div class=\"links\">{}{}{}</div>\
         <div class=\"navclock\">{}: <span id=\"nav-clock\">--:--:--</span></div>\
         <div class=\"langset\">{}{}</div></div>",
        link("index.html", catalog.tr("nav_laikai", "Passes"), "laikai"),
        link("galerija.html", catalog.tr("nav_galerija", "Gallery"), "galerija"),
        link(
            "nustatymai.html",
            catalog.tr("nav_nustatymai", "Settings"),
            "nustatymai"
        ),
        catalog.tr("nav_local_time", "Local time"),
        lang_link("lt"),
        lang_link("en"),
    )
}

const PAGE_CSS: &str = "body{background:#111;color:#eee;font-family:sans-serif;text-align:center}\
.navbar{display:flex;align-items:center;justify-content:space-between;background:#1a1a1a;border-bottom:1px solid #333;padding:10px 16px}\
.navlink{color:#ddd;text-decoration:none;padding:6px 10px;border-radius:8px}\
.navlink.active{background:#0b640b;color:#dfffdc;font-weight:700}\
.navclock{font-family:monospace;color:#0f0}\
.lang{padding:4px 8px;border:1px solid #333;border-radius:6px;background:#222;color:#ddd;text-decoration:none;font-size:12px;margin-left:4px}\
.lang.active{background:#0b640b;border-color:#0b640b;color:#dfffdc}\
table{margin:auto;border-collapse:collapse;width:95%}\
th,td{border:1px solid #444;padding:8px}th{background:#333}\
tr.visible{background:#223322}tr.tracking{background:#0b640b;color:#dfffdc;font-weight:700}\
tr.chosen{outline:2px solid #0f0}tr.past{opacity:.45}\
.badge{background:#ffd54f;color:#111;font-weight:700;border-radius:999px;padding:2px 8px;font-size:11px;margin-right:8px}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(320px,1fr));gap:16px;width:95%;margin:20px auto}\
.card{background:#1b1b1b;border:1px solid #333;border-radius:8px;overflow:hidden}\
.card img{width:100%;height:300px;object-fit:cover;display:block}\
.card .meta{padding:10px;font-size:14px}\
form,.panel{width:90%;max-width:900px;margin:10px auto;background:#1b1b1b;border:1px solid #333;border-radius:10px;padding:16px;text-align:left}\
.row{display:grid;grid-template-columns:1fr 2fr;gap:10px;margin-bottom:8px;align-items:center}\
.row input,.row textarea,.row select{width:100%;padding:6px;border:1px solid #444;border-radius:6px;background:#111;color:#eee}\
.btn{padding:8px 14px;border-radius:8px;border:1px solid #0b640b;background:#0b640b;color:#dfffdc;cursor:pointer;font-weight:700}\
a{color:#0f0;text-decoration:none}";

const CLOCK_JS: &str = "function tick(){var e=document.getElementById('nav-clock');\
if(e)e.textContent=new Date().toLocaleTimeString();}\
document.addEventListener('DOMContentLoaded',function(){tick();setInterval(tick,1000);});";

fn page(title: &str, extra_head: &str, nav_html: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>{}</title>\
         <style>{}</style><script>{}</script>{}</head><body>{}{}</body></html>",
        esc(title),
        PAGE_CSS,
        CLOCK_JS,
        extra_head,
        nav_html,
        body
    )
}

fn first_thumb(pass: &GalleryPass, base: &Path) -> Option<String> {
    pass.thumbs
        .first()
        .or_else(|| pass.images.first())
        .map(|p| rel_href(p, base))
}

fn rel_href(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn gallery_cards(passes: &[GalleryPass], base: &Path, limit: usize) -> String {
    let mut out = String::from("<div class=\"grid\">");
    for pass in passes.iter().take(limit) {
        let Some(thumb) = first_thumb(pass, base) else {
            continue;
        };
        let sat = pass
            .meta
            .as_ref()
            .map(|m| m.satellite.clone())
            .unwrap_or_else(|| pass.name.splitn(3, '_').nth(2).unwrap_or(&pass.name).to_string());
        let start = pass
            .meta
            .as_ref()
            .map(|m| m.start_local.replace('T', " "))
            .unwrap_or_default();
        let _ = write!(
            out,
            "<div class=\"card\"><a href=\"pass-{name}.html\"><img src=\"{thumb}\" alt=\"thumb\"></a>\
             <div class=\"meta\"><div><b>{sat}</b></div><div>{start}</div></div></div>",
            name = esc(&pass.name),
            thumb = esc(&thumb),
            sat = esc(&sat),
            start = esc(&start),
        );
    }
    out.push_str("</div>");
    out
}

/// Write index.html, galerija.html, nustatymai.html and the per-pass
/// gallery pages.
pub fn render_pages(
    base: &Path,
    settings: &Settings,
    catalog: &Catalog,
    plan: &Plan,
    zone: &LocalZone,
    passes: &[GalleryPass],
    selection: &HashSet<String>,
) -> anyhow::Result<()> {
    write_index(base, settings, catalog, plan, zone, passes, selection)?;
    write_gallery(base, settings, catalog, passes)?;
    write_settings_page(base, settings, catalog)?;
    for pass in passes {
        write_pass_page(base, settings, catalog, pass)?;
    }
    Ok(())
}

fn write_index(
    base: &Path,
    settings: &Settings,
    catalog: &Catalog,
    plan: &Plan,
    zone: &LocalZone,
    passes: &[GalleryPass],
    selection: &HashSet<String>,
) -> anyhow::Result<()> {
    // Pairwise overlap marking for the conflict badge.
    let ids: Vec<String> = plan.windows.iter().map(|w| w.id(zone)).collect();
    let mut overlapping: HashSet<&str> = HashSet::new();
    for (i, a) in plan.windows.iter().enumerate() {
        for (j, b) in plan.windows.iter().enumerate().skip(i + 1) {
            if a.t_rise < b.t_set && a.t_set > b.t_rise {
                overlapping.insert(&ids[i]);
                overlapping.insert(&ids[j]);
            }
        }
    }

    let mut rows = String::new();
    for (i, w) in plan.windows.iter().enumerate() {
        let id = &ids[i];
        let chosen = if selection.contains(id) { " chosen" } else { "" };
        let mut name_cell = esc(&w.sat_name);
        if overlapping.contains(id.as_str()) {
            let checked = if selection.contains(id) { " checked" } else { "" };
            name_cell = format!(
                "<span class=\"badge\">{}</span>\
                 <label><input class=\"choose\" type=\"checkbox\" data-id=\"{}\"{}> {}</label> {}",
                catalog.tr("badge_conflict", "Conflict"),
                esc(id),
                checked,
                catalog.tr("follow", "Follow"),
                name_cell
            );
        }
        let _ = write!(
            rows,
            "<tr class=\"{chosen}\" data-id=\"{id}\" data-start=\"{st}\" data-end=\"{en}\">\
             <td>{name_cell}</td><td>{rise}</td><td>{set}</td><td>{elev:.0}</td></tr>",
            chosen = chosen.trim(),
            id = esc(id),
            st = w.t_rise.to_rfc3339(),
            en = w.t_set.to_rfc3339(),
            name_cell = name_cell,
            rise = zone.to_local(w.t_rise).format("%H:%M"),
            set = zone.to_local(w.t_set).format("%H:%M"),
            elev = w.max_elev_deg,
        );
    }

    let live_js = "<script>\
function updateRows(){var now=Date.now();document.querySelectorAll('tr[data-start]').forEach(function(tr){\
var t1=Date.parse(tr.dataset.start),t2=Date.parse(tr.dataset.end);\
tr.classList.remove('visible','past');\
if(now>=t1&&now<=t2)tr.classList.add('visible');else if(now>t2)tr.classList.add('past');});}\
function pollTracking(){fetch('current.json?ts='+Date.now(),{cache:'no-store'}).then(function(r){return r.json()}).then(function(j){\
var id=(j&&j.id)||'';document.querySelectorAll('tr[data-id]').forEach(function(tr){\
tr.classList.toggle('tracking',tr.dataset.id===id);});}).catch(function(){});}\
function pollSelection(){fetch('selection.json?ts='+Date.now(),{cache:'no-store'}).then(function(r){return r.json()}).then(function(j){\
var ids=(j&&j.ids)||[];document.querySelectorAll('tr[data-id]').forEach(function(tr){\
tr.classList.toggle('chosen',ids.indexOf(tr.dataset.id)>=0);});\
document.querySelectorAll('input.choose').forEach(function(cb){cb.checked=ids.indexOf(cb.dataset.id)>=0;});}).catch(function(){});}\
document.addEventListener('change',function(e){var cb=e.target;if(!cb.matches||!cb.matches('input.choose'))return;\
fetch('/api/select?op='+(cb.checked?'add':'remove')+'&id='+encodeURIComponent(cb.dataset.id),{cache:'no-store'});});\
document.addEventListener('DOMContentLoaded',function(){updateRows();pollTracking();pollSelection();\
setInterval(updateRows,1000);setInterval(pollTracking,2000);setInterval(pollSelection,2000);});\
</script>";

    let body = format!(
        "<h2>{}</h2>\
         <div><span class=\"badge\">!</span> {}</div>\
         <table><tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr>{}</table>\
         <img src=\"{}\" style=\"margin-top:10px;max-width:95%\">\
         <h2>{}</h2>{}",
        catalog.tr("h2_laikai", "Pass windows (local time)"),
        catalog.tr("legend_conflict", "Conflicting time"),
        catalog.tr("tbl_satellite", "Satellite"),
        catalog.tr("tbl_aos", "AOS"),
        catalog.tr("tbl_los", "LOS"),
        catalog.tr("tbl_maxelev", "Max elevation"),
        rows,
        CHART_FILE,
        catalog.tr("recent_passes", "Recent passes"),
        gallery_cards(passes, base, 8),
    );

    let html = page(
        catalog.tr("nav_laikai", "Passes"),
        live_js,
        &nav(catalog, &settings.lang, "laikai"),
        &body,
    );
    std::fs::write(base.join("index.html"), html)?;
    Ok(())
}

fn write_gallery(
    base: &Path,
    settings: &Settings,
    catalog: &Catalog,
    passes: &[GalleryPass],
) -> anyhow::Result<()> {
    let body = format!(
        "<h2>{}</h2>{}",
        catalog.tr("gallery_title", "Gallery"),
        gallery_cards(passes, base, usize::MAX),
    );
    let html = page(
        catalog.tr("nav_galerija", "Gallery"),
        "",
        &nav(catalog, &settings.lang, "galerija"),
        &body,
    );
    std::fs::write(base.join("galerija.html"), html)?;
    Ok(())
}

fn write_pass_page(
    base: &Path,
    settings: &Settings,
    catalog: &Catalog,
    pass: &GalleryPass,
) -> anyhow::Result<()> {
    let sat = pass
        .meta
        .as_ref()
        .map(|m| m.satellite.clone())
        .unwrap_or_else(|| pass.name.clone());
    let start = pass
        .meta
        .as_ref()
        .map(|m| m.start_local.replace('T', " "))
        .unwrap_or_default();

    let mut grid = String::from("<div class=\"grid\">");
    for img in &pass.images {
        let href = rel_href(img, base);
        let _ = write!(
            grid,
            "<div class=\"card\"><a href=\"{href}\"><img src=\"{href}\" alt=\"img\"></a></div>",
            href = esc(&href)
        );
    }
    grid.push_str("</div>");

    let body = format!("<h2>{}</h2><div>{}</div>{}", esc(&sat), esc(&start), grid);
    let html = page(
        &sat,
        "",
        &nav(catalog, &settings.lang, "galerija"),
        &body,
    );
    std::fs::write(base.join(format!("pass-{}.html", pass.name)), html)?;
    Ok(())
}

fn write_settings_page(base: &Path, settings: &Settings, catalog: &Catalog) -> anyhow::Result<()> {
    let text_keys = [
        "TLE_URL",
        "KOORD_LAT",
        "KOORD_LON",
        "SERIAL_PORT",
        "BAUDRATE",
        "UPDATE_INTERVAL",
        "ALTITUDE_LIMIT",
        "HTTP_PORT",
        "NUOTRAUKU_KATALOGAS",
        "SATDUMP_SOURCE",
        "SATDUMP_RATE",
        "SATDUMP_DEVICE_ARGS",
        "SATDUMP_MODE",
        "SATDUMP_LEAD",
        "SATDUMP_TAIL",
        "GALLERY_KEEP_DAYS",
        "TIMEZONE",
    ];
    let mut form_rows = format!(
        "<div class=\"row\"><label>{}</label><select name=\"LANG\">\
         <option value=\"lt\">LT</option><option value=\"en\">EN</option></select></div>\
         <div class=\"row\"><label>USE_MANUAL_TLE</label>\
         <input type=\"checkbox\" id=\"USE_MANUAL_TLE\" name=\"USE_MANUAL_TLE\"></div>",
        catalog.tr("lang_label", "Language"),
    );
    for key in text_keys {
        let _ = write!(
            form_rows,
            "<div class=\"row\"><label for=\"{key}\">{key}</label>\
             <input type=\"text\" id=\"{key}\" name=\"{key}\"></div>"
        );
    }

    let js = "<script>\
document.addEventListener('DOMContentLoaded',function(){\
fetch('/api/settings',{cache:'no-store'}).then(function(r){return r.json()}).then(function(d){\
for(var k in d){var el=document.querySelector('[name=\"'+k+'\"]');if(!el)continue;\
if(el.type==='checkbox')el.checked=(d[k]===1||d[k]==='1'||d[k]===true);else el.value=String(d[k]);}});\
fetch('/api/tle_txt',{cache:'no-store'}).then(function(r){return r.json()}).then(function(j){\
if(j.ok)document.getElementById('tle-text').value=j.text||'';});\
document.getElementById('settings-form').addEventListener('submit',function(e){\
e.preventDefault();var p=new URLSearchParams();\
document.querySelectorAll('#settings-form input[type=text],#settings-form select').forEach(function(el){\
if(el.name)p.append(el.name,el.value);});\
var cb=document.getElementById('USE_MANUAL_TLE');p.append('USE_MANUAL_TLE',cb.checked?'1':'0');\
fetch('/api/settings',{method:'POST',headers:{'Content-Type':'application/x-www-form-urlencoded'},body:p});});\
document.getElementById('tle-save').addEventListener('click',function(){\
var p=new URLSearchParams();p.append('data',document.getElementById('tle-text').value||'');\
fetch('/api/tle_manual',{method:'POST',headers:{'Content-Type':'application/x-www-form-urlencoded'},body:p});});\
document.getElementById('btn-replan').addEventListener('click',function(){\
fetch('/api/replan?ts='+Date.now(),{cache:'no-store'});});\
document.getElementById('btn-clean').addEventListener('click',function(){\
var d=document.querySelector('[name=\"GALLERY_KEEP_DAYS\"]').value||'0';\
fetch('/api/cleanup?days='+d,{cache:'no-store'});});\
function refreshList(){fetch('/api/satlist',{cache:'no-store'}).then(function(r){return r.json()}).then(function(j){\
var box=document.getElementById('sat-chosen');box.innerHTML='';\
(j.list||[]).forEach(function(name){var div=document.createElement('div');\
var btn=document.createElement('button');btn.textContent='-';btn.onclick=function(){\
var p=new URLSearchParams();p.append('op','remove');p.append('name',name);\
fetch('/api/satlist',{method:'POST',headers:{'Content-Type':'application/x-www-form-urlencoded'},body:p}).then(refreshList);};\
div.textContent=name+' ';div.appendChild(btn);box.appendChild(div);});});}\
function search(){fetch('/api/tle_names?q='+encodeURIComponent(document.getElementById('sat-q').value||''),{cache:'no-store'})\
.then(function(r){return r.json()}).then(function(j){\
var box=document.getElementById('sat-results');box.innerHTML='';\
(j.names||[]).forEach(function(name){var div=document.createElement('div');\
var btn=document.createElement('button');btn.textContent='+';btn.onclick=function(){\
var p=new URLSearchParams();p.append('op','add');p.append('name',name);\
fetch('/api/satlist',{method:'POST',headers:{'Content-Type':'application/x-www-form-urlencoded'},body:p}).then(refreshList);};\
div.textContent=name+' ';div.appendChild(btn);box.appendChild(div);});});}\
document.getElementById('sat-q').addEventListener('input',search);\
refreshList();search();});\
</script>";

    let body = format!(
        "<h2>{title}</h2>\
         <form id=\"settings-form\">{form_rows}\
         <button class=\"btn\" type=\"submit\">{save}</button></form>\
         <div class=\"panel\"><h3>{tle_title}</h3>\
         <textarea id=\"tle-text\" rows=\"10\" style=\"width:100%;font-family:monospace\"></textarea>\
         <button class=\"btn\" id=\"tle-save\" type=\"button\">TLE</button></div>\
         <div class=\"panel\"><h3>{sat_title}</h3>\
         <input id=\"sat-q\" type=\"text\" placeholder=\"{search}\">\
         <div id=\"sat-results\"></div>\
         <div>{chosen_label}</div><div id=\"sat-chosen\"></div>\
         <button class=\"btn\" id=\"btn-replan\" type=\"button\">{replan}</button></div>\
         <div class=\"panel\"><h3>{clean_title}</h3>\
         <button class=\"btn\" id=\"btn-clean\" type=\"button\">{clean_now}</button></div>",
        title = catalog.tr("settings_title", "Settings"),
        form_rows = form_rows,
        save = catalog.tr("btn_save", "Save"),
        tle_title = catalog.tr("manual_tle_title", "Manual TLE"),
        sat_title = catalog.tr("satlist_title", "Satellite list"),
        search = catalog.tr("search_placeholder", "Search TLE name..."),
        chosen_label = catalog.tr("current_list_label", "Current list"),
        replan = catalog.tr("replan_button", "Replan"),
        clean_title = catalog.tr("cleanup_title", "Gallery cleanup"),
        clean_now = catalog.tr("cleanup_now", "Clean now"),
    );

    let html = page(
        catalog.tr("nav_nustatymai", "Settings"),
        js,
        &nav(catalog, &settings.lang, "nustatymai"),
        &body,
    );
    std::fs::write(base.join("nustatymai.html"), html)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pass_scheduler::{build_index, PassWindow};

    fn sample_plan(zone: &LocalZone) -> Plan {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let windows = vec![
            PassWindow {
                sat_name: "NOAA 19".to_string(),
                t_rise: base,
                t_culm: base + Duration::minutes(7),
                t_set: base + Duration::minutes(15),
                max_elev_deg: 40.0,
            },
            PassWindow {
                sat_name: "METOP-B".to_string(),
                t_rise: base + Duration::minutes(10),
                t_culm: base + Duration::minutes(15),
                t_set: base + Duration::minutes(20),
                max_elev_deg: 25.0,
            },
        ];
        let index = build_index(&windows, zone);
        Plan { windows, index }
    }

    #[test]
    fn test_index_page_marks_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let zone = LocalZone::parse("UTC");
        let plan = sample_plan(&zone);
        let settings = Settings::default();
        let catalog = Catalog::default();

        render_pages(
            dir.path(),
            &settings,
            &catalog,
            &plan,
            &zone,
            &[],
            &HashSet::new(),
        )
        .unwrap();

        let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(html.contains("20240601_1000_NOAA_19"));
        assert!(html.contains("20240601_1010_METOP-B"));
        // Both windows overlap, so both carry the conflict checkbox.
        assert_eq!(html.matches("class=\"choose\"").count(), 2);
        assert!(dir.path().join("galerija.html").exists());
        assert!(dir.path().join("nustatymai.html").exists());
    }

    #[test]
    fn test_chart_renders_empty_and_filled() {
        let dir = tempfile::tempdir().unwrap();
        let zone = LocalZone::parse("UTC");

        let empty = Plan::default();
        render_chart(&dir.path().join("empty.png"), &empty, &zone).unwrap();
        assert!(dir.path().join("empty.png").exists());

        let plan = sample_plan(&zone);
        render_chart(&dir.path().join("chart.png"), &plan, &zone).unwrap();
        assert!(dir.path().join("chart.png").exists());
    }

    #[test]
    fn test_escape() {
        assert_eq!(esc("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
