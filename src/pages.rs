//! Server-rendered HTML for the form, confirmation and listing pages.

use std::fmt::Write;

use time::{OffsetDateTime, UtcOffset};

use crate::form::{FormController, TOKEN_FIELD};
use crate::store::EXPORT_FILE_NAME;
use crate::submission::{Field, Gender, Submission};
use crate::timestamp;

const TITLE: &str = "डेटा फ़ॉर्म";

const STYLE: &str = "body{margin:0;background:#f9fafb;color:#111827;font-family:sans-serif}\
.shell{max-width:48rem;margin:0 auto;padding:1.5rem}\
.card{background:#fff;border-radius:.5rem;padding:1.5rem;box-shadow:0 1px 3px rgba(0,0,0,.1)}\
.grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(16rem,1fr));gap:1rem}\
.wide{grid-column:1/-1}\
label{display:block;font-size:.875rem;font-weight:500}\
input,select,textarea{box-sizing:border-box;width:100%;margin-top:.25rem;padding:.5rem;border:1px solid #d1d5db;border-radius:.25rem}\
.error{margin:.25rem 0 0;color:#dc2626;font-size:.875rem}\
.button{display:inline-block;border:0;border-radius:.25rem;padding:.5rem 1rem;background:#2563eb;color:#fff;text-decoration:none;cursor:pointer}\
.button.plain{background:#e5e7eb;color:#1f2937}\
.actions{display:flex;align-items:center;justify-content:space-between;gap:.75rem;margin-top:1.25rem}\
table{min-width:100%;border-collapse:collapse;font-size:.875rem}\
th,td{border:1px solid #e5e7eb;padding:.25rem .5rem;text-align:left}\
th{background:#f3f4f6}\
footer{margin-top:2.5rem;text-align:center;font-size:.875rem;color:#6b7280}";

/// Escapes text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    escaped
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"hi\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<meta name=\"description\" content=\"एक सरल डेटा संग्रह फ़ॉर्म\">\n\
<title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n<div class=\"shell\">\n\
<header><h1>{title}</h1><p>कृपया नीचे का फ़ॉर्म भरें</p></header>\n\
{body}\n<footer>© {year} {app}</footer>\n</div>\n</body>\n</html>\n",
        title = TITLE,
        style = STYLE,
        body = body,
        year = OffsetDateTime::now_utc().year(),
        app = info::APP_NAME,
    )
}

fn placeholder(field: Field) -> Option<&'static str> {
    match field {
        Field::FullName => Some("अपना पूरा नाम लिखें"),
        Field::Email => Some("example@domain.com"),
        Field::Phone => Some("10 अंकों का मोबाइल"),
        Field::Address => Some("घर नंबर, गली, मोहल्ला"),
        Field::Pincode => Some("6 अंकों का पिनकोड"),
        Field::Remarks => Some("कोई भी अतिरिक्त जानकारी यहाँ लिखें"),
        _ => None,
    }
}

fn control(field: Field, value: &str) -> String {
    let name = field.name();
    let placeholder = placeholder(field)
        .map(|p| format!(" placeholder=\"{}\"", p))
        .unwrap_or_default();

    match field {
        Field::Gender => {
            let selected = Gender::parse(value);
            let mut select = format!("<select id=\"{0}\" name=\"{0}\">", name);

            for choice in [Gender::Unset].iter().chain(Gender::CHOICES.iter()) {
                let _ = write!(
                    select,
                    "<option value=\"{}\"{}>{}</option>",
                    choice.as_str(),
                    if *choice == selected { " selected" } else { "" },
                    choice.label()
                );
            }

            select.push_str("</select>");
            select
        }
        Field::Remarks => format!(
            "<textarea id=\"{0}\" name=\"{0}\" rows=\"3\"{1}>{2}</textarea>",
            name,
            placeholder,
            escape(value)
        ),
        _ => {
            let kind = match field {
                Field::Email => "type=\"email\"",
                Field::Phone => "type=\"tel\" inputmode=\"numeric\" maxlength=\"10\"",
                Field::Dob => "type=\"date\"",
                Field::Pincode => "type=\"text\" inputmode=\"numeric\" maxlength=\"6\"",
                _ => "type=\"text\"",
            };

            format!(
                "<input id=\"{0}\" name=\"{0}\" {1} value=\"{2}\"{3}>",
                name,
                kind,
                escape(value),
                placeholder
            )
        }
    }
}

/// The submission form. Errors are rendered inline when `show_errors` is
/// set, i.e. after a rejected submit.
pub fn form(form: &FormController, show_errors: bool) -> String {
    let mut fields = String::new();

    for field in Field::ALL.iter().copied() {
        let wide = match field {
            Field::Address | Field::Remarks => " class=\"wide\"",
            _ => "",
        };

        let error = if show_errors {
            form.errors()
                .get(field)
                .map(|message| format!("<p class=\"error\">{}</p>", message))
                .unwrap_or_default()
        } else {
            String::new()
        };

        let _ = write!(
            fields,
            "<div{}><label for=\"{}\">{}</label>{}{}</div>\n",
            wide,
            field.name(),
            field.label(),
            control(field, form.state().value(field)),
            error
        );
    }

    let body = format!(
        "<main>\n<form class=\"card\" method=\"post\" action=\"/\" \
onsubmit=\"this.querySelector('button[type=submit]').disabled=true\">\n\
<input type=\"hidden\" name=\"{token_field}\" value=\"{token}\">\n<div class=\"grid\">\n{fields}</div>\n\
<div class=\"actions\"><p>डेटा स्थानीय रूप से भी सहेजा जाता है (इंटरनेट न होने पर भी)</p>\
<button class=\"button\" type=\"submit\"{disabled}>जमा करें</button></div>\n</form>\n\
<p><a href=\"/data\">सहेजा गया डेटा देखें</a></p>\n</main>",
        token_field = TOKEN_FIELD,
        token = escape(form.token()),
        fields = fields,
        disabled = if form.is_submitting() { " disabled" } else { "" },
    );

    layout(&body)
}

/// The confirmation shown after a submit.
pub fn success() -> String {
    layout(
        "<main class=\"card\">\n<h2>धन्यवाद!</h2>\n<p>आपका डेटा सफलतापूर्वक सहेज लिया गया है।</p>\n\
<p><a href=\"/\">नया फ़ॉर्म भरें</a> · <a href=\"/data\">सहेजा गया डेटा देखें</a></p>\n</main>",
    )
}

/// The table of stored submissions with export and clear actions.
pub fn listing(submissions: &[Submission], offset: UtcOffset) -> String {
    let content = if submissions.is_empty() {
        "<p class=\"empty\">अभी तक कोई डेटा सहेजा नहीं गया।</p>".to_owned()
    } else {
        let mut rows = String::new();

        for s in submissions {
            let cells = [
                s.full_name.as_str(),
                s.email.as_str(),
                s.phone.as_str(),
                s.dob.as_str(),
                s.gender.as_str(),
                s.city.as_str(),
                s.state.as_str(),
                s.pincode.as_str(),
                s.remarks.as_str(),
            ];

            rows.push_str("<tr>");
            for cell in cells.iter() {
                let _ = write!(rows, "<td>{}</td>", escape(cell));
            }
            let _ = write!(
                rows,
                "<td>{}</td></tr>\n",
                escape(&timestamp::display(&s.created_at, offset))
            );
        }

        format!(
            "<div style=\"overflow-x:auto\"><table>\n<thead><tr>\
<th>नाम</th><th>ईमेल</th><th>मोबाइल</th><th>जन्म तिथि</th><th>लिंग</th>\
<th>शहर</th><th>राज्य</th><th>पिनकोड</th><th>टिप्पणी</th><th>समय</th>\
</tr></thead>\n<tbody>\n{}</tbody>\n</table></div>",
            rows
        )
    };

    let body = format!(
        "<main class=\"card\">\n<div class=\"actions\"><h2>सहेजा गया डेटा</h2><div class=\"actions\">\
<a class=\"button\" href=\"/data/{file}\" download=\"{file}\">JSON डाउनलोड करें</a>\
<form method=\"post\" action=\"/data/clear\"><button class=\"button plain\" type=\"submit\">सब साफ़ करें</button></form>\
</div></div>\n{content}\n<p><a href=\"/\">फ़ॉर्म पर वापस जाएँ</a></p>\n</main>",
        file = EXPORT_FILE_NAME,
        content = content,
    );

    layout(&body)
}
