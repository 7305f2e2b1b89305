//! Just enough HTML scanning to walk a flat data table.
//!
//! Elements are matched by tag name, case-insensitively. An element ends at its closing
//! tag or at the next opening tag of the same name, whichever comes first, which covers
//! the optional `</td>`/`</tr>` forms. Nested elements of the same name are not
//! supported.

#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    pub attrs: &'a str,
    pub inner: &'a str,
}

impl<'a> Element<'a> {
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        attr_value(self.attrs, name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|v| v.split_ascii_whitespace().any(|c| c.eq_ignore_ascii_case(class)))
            .unwrap_or(false)
    }

    pub fn children(&self, tag: &str) -> Elements<'a> {
        elements(self.inner, tag)
    }

    pub fn text(&self) -> String {
        inner_text(self.inner)
    }
}

pub struct Elements<'a> {
    src: &'a str,
    lower: String,
    open: String,
    close: String,
    pos: usize,
}

pub fn elements<'a>(src: &'a str, tag: &str) -> Elements<'a> {
    let tag = tag.to_ascii_lowercase();
    Elements {
        src,
        lower: src.to_ascii_lowercase(),
        open: format!("<{tag}"),
        close: format!("</{tag}"),
        pos: 0,
    }
}

impl<'a> Elements<'a> {
    /// Next `pattern` (`<tag` or `</tag`) at or after `from` that is followed by a tag
    /// boundary, so `<th` does not match `<thead`.
    fn find_tag(&self, pattern: &str, from: usize) -> Option<usize> {
        let mut from = from;
        loop {
            let idx = from + self.lower.get(from..)?.find(pattern)?;
            let next = self.lower.as_bytes().get(idx + pattern.len()).copied();
            match next {
                Some(b) if b == b'>' || b == b'/' || b.is_ascii_whitespace() => return Some(idx),
                _ => from = idx + pattern.len(),
            }
        }
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Element<'a>> {
        let start = self.find_tag(&self.open, self.pos)?;
        let attrs_start = start + self.open.len();
        let tag_end = attrs_start + self.lower[attrs_start..].find('>')?;
        let attrs = self.src[attrs_start..tag_end].trim().trim_end_matches('/');
        let inner_start = tag_end + 1;

        let close = self.find_tag(&self.close, inner_start);
        let sibling = self.find_tag(&self.open, inner_start);

        let (inner_end, resume) = match (close, sibling) {
            (Some(c), Some(s)) if s < c => (s, s),
            (Some(c), _) => {
                let after = self.lower[c..].find('>').map(|i| c + i + 1);
                (c, after.unwrap_or(self.src.len()))
            }
            (None, Some(s)) => (s, s),
            (None, None) => (self.src.len(), self.src.len()),
        };

        self.pos = resume;
        Some(Element {
            attrs,
            inner: &self.src[inner_start..inner_end],
        })
    }
}

fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let lower = attrs.to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    let mut from = 0;
    while let Some(i) = lower[from..].find(&name) {
        let idx = from + i;
        from = idx + name.len();

        let boundary = idx == 0 || lower.as_bytes()[idx - 1].is_ascii_whitespace();
        let rest = lower[from..].trim_start();
        if !boundary || !rest.starts_with('=') {
            continue;
        }

        let value_start = attrs.len() - rest.len() + 1;
        let value = attrs[value_start..].trim_start();
        let offset = attrs.len() - value.len();
        return Some(match value.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &attrs[offset + 1..];
                body.find(q).map(|end| &body[..end]).unwrap_or(body)
            }
            _ => {
                let end = value
                    .find(|c: char| c.is_ascii_whitespace())
                    .unwrap_or(value.len());
                &value[..end]
            }
        });
    }
    None
}

/// Visible text of a fragment: tags dropped, entities decoded, whitespace collapsed.
pub fn inner_text(fragment: &str) -> String {
    let mut raw = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                raw.push(' ');
            }
            _ if !in_tag => raw.push(c),
            _ => {}
        }
    }
    let decoded = decode_entities(&raw);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
