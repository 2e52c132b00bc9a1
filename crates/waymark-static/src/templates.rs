//! Template engine for rendering page furniture partials.

use minijinja::{context, Environment, Value};
use serde::Serialize;
use waymark_config::{NavEntry, SocialLink};
use waymark_resolver::{classify, LinkTarget, PageDirectives, ValidSiteConfig};

/// Context for rendering the furniture around one page.
#[derive(Debug, Clone, Serialize)]
pub struct Furniture<'a> {
    /// Site title
    pub site_title: &'a str,
    /// Base path prepended to internal links
    pub base_path: &'a str,
    /// Logo asset path
    pub logo: Option<&'a str>,
    /// Top navigation entries
    pub nav: &'a [NavEntry],
    /// Social links shown in the nav bar
    pub social_links: &'a [SocialLink],
    /// Resolved directives for the page
    pub page: &'a PageDirectives<'a>,
}

impl<'a> Furniture<'a> {
    pub fn new(site: &'a ValidSiteConfig, page: &'a PageDirectives<'a>) -> Self {
        Self {
            site_title: &site.title,
            base_path: &site.base_path,
            logo: site.logo.as_deref(),
            nav: &site.nav,
            social_links: &site.social_links,
            page,
        }
    }
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the default furniture templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_filter("href", href);
        env.add_test("current_page", is_current_page);

        env.add_template("furniture.html", FURNITURE_TEMPLATE)
            .expect("Failed to add furniture template");
        env.add_template("nav.html", NAV_TEMPLATE)
            .expect("Failed to add nav template");
        env.add_template("sidebar.html", SIDEBAR_TEMPLATE)
            .expect("Failed to add sidebar template");

        Self { env }
    }

    /// Render the furniture partial for a page.
    pub fn render_furniture(&self, furniture: &Furniture<'_>) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("furniture.html")?;
        let active_index = furniture.page.active_nav.and_then(|active| {
            furniture
                .nav
                .iter()
                .position(|entry| std::ptr::eq(entry, active))
        });

        tmpl.render(context! {
            site_title => furniture.site_title,
            base_path => furniture.base_path,
            logo => furniture.logo,
            nav => furniture.nav,
            social_links => furniture.social_links,
            active_index => active_index,
            page => furniture.page,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// `href` filter: base-prefixed link, escaped for use in an attribute.
fn href(link: String, base_path: String) -> Value {
    let url = with_base(&link, &base_path)
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    Value::from_safe_string(url)
}

/// `current_page` test: whether an internal link resolves to the page path.
fn is_current_page(link: String, path: String) -> bool {
    matches!(classify(&link), Ok(LinkTarget::Internal(target)) if target == path)
}

/// Prefix internal links with the base path; leave URLs untouched.
fn with_base(link: &str, base_path: &str) -> String {
    if link.starts_with('/') && !link.starts_with("//") {
        format!("{}{}", base_path.trim_end_matches('/'), link)
    } else {
        link.to_string()
    }
}

const FURNITURE_TEMPLATE: &str = r##"<div class="furniture" data-path="{{ page.path }}">
  <header class="nav-bar">
    {% include "nav.html" %}
  </header>
  {% if page.sidebar %}
  <aside class="sidebar">
    {% include "sidebar.html" %}
  </aside>
  {% endif %}
  <footer class="doc-footer">
    {% if page.edit_link %}
    <a class="edit-link" href="{{ page.edit_link.url | href(base_path) }}">{{ page.edit_link.text }}</a>
    {% endif %}
    <nav class="prev-next">
      {% if page.prev %}<a class="prev" href="{{ page.prev.link | href(base_path) }}">{{ page.prev.label }}</a>{% endif %}
      {% if page.next %}<a class="next" href="{{ page.next.link | href(base_path) }}">{{ page.next.label }}</a>{% endif %}
    </nav>
  </footer>
  {% if page.footer %}
  <footer class="site-footer">
    {% if page.footer.message %}<p class="message">{{ page.footer.message }}</p>{% endif %}
    {% if page.footer.copyright %}<p class="copyright">{{ page.footer.copyright }}</p>{% endif %}
  </footer>
  {% endif %}
</div>"##;

const NAV_TEMPLATE: &str = r##"<a href="{{ base_path }}" class="nav-logo">{% if logo %}<img src="{{ logo | href(base_path) }}" alt="">{% endif %}{{ site_title }}</a>
<ul class="nav-list">
{% for entry in nav %}
  <li class="nav-item{% if loop.index0 == active_index %} active{% endif %}">
  {% if entry.items is defined %}
    <span class="nav-dropdown">{{ entry.label }}</span>
    <ul class="nav-children">
      {% for item in entry.items %}
      <li class="nav-item"><a href="{{ item.link | href(base_path) }}">{{ item.label }}</a></li>
      {% endfor %}
    </ul>
  {% else %}
    <a href="{{ entry.link | href(base_path) }}">{{ entry.label }}</a>
  {% endif %}
  </li>
{% endfor %}
</ul>
{% if social_links %}
<ul class="social-links">
  {% for social in social_links %}
  <li><a href="{{ social.link | href(base_path) }}" aria-label="{{ social.icon }}" class="icon-{{ social.icon }}"></a></li>
  {% endfor %}
</ul>
{% endif %}"##;

const SIDEBAR_TEMPLATE: &str = r##"<ul class="sidebar-groups">
{% for item in page.sidebar recursive %}
  {% if item.items is defined %}
  <li class="sidebar-group{% if item.collapsed %} collapsed{% endif %}">
    <p class="sidebar-label">{{ item.label }}</p>
    <ul class="sidebar-items">{{ loop(item.items) }}</ul>
  </li>
  {% else %}
  <li class="sidebar-item{% if item.link is current_page(page.path) %} active{% endif %}">
    <a href="{{ item.link | href(base_path) }}">{{ item.label }}</a>
  </li>
  {% endif %}
{% endfor %}
</ul>"##;
