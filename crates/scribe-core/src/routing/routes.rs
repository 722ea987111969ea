//! Named routes with static auth attributes.
//!
//! Routes are declared as a tree (children use relative paths) and flattened
//! into records. A child's attributes are OR-ed with its ancestors', so a
//! protected parent protects everything under it.

/// Attributes the guard reads from a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub redirect_if_authenticated: bool,
}

impl RouteMeta {
    pub const PUBLIC: RouteMeta = RouteMeta {
        requires_auth: false,
        redirect_if_authenticated: false,
    };

    pub const PROTECTED: RouteMeta = RouteMeta {
        requires_auth: true,
        redirect_if_authenticated: false,
    };

    /// Pages only meaningful when signed out (login, register).
    pub const GUEST_ONLY: RouteMeta = RouteMeta {
        requires_auth: false,
        redirect_if_authenticated: true,
    };

    fn inherit(self, parent: RouteMeta) -> RouteMeta {
        RouteMeta {
            requires_auth: self.requires_auth || parent.requires_auth,
            redirect_if_authenticated: self.redirect_if_authenticated
                || parent.redirect_if_authenticated,
        }
    }
}

/// A route declaration.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    path: String,
    meta: RouteMeta,
    children: Vec<Route>,
}

impl Route {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            meta: RouteMeta::PUBLIC,
            children: Vec::new(),
        }
    }

    pub fn meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn children(mut self, children: Vec<Route>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Record {
    name: String,
    pattern: String,
    segments: Vec<Segment>,
    meta: RouteMeta,
}

/// A resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: String,
    pub pattern: String,
    pub meta: RouteMeta,
    params: Vec<(String, String)>,
}

impl RouteMatch {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Flattened, matchable route records.
#[derive(Debug, Clone)]
pub struct RouteTable {
    records: Vec<Record>,
}

fn path_segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn join(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        child.to_string()
    } else if child.is_empty() {
        parent.to_string()
    } else {
        format!("{}/{child}", parent.trim_end_matches('/'))
    }
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        let mut records = Vec::new();
        for route in routes {
            flatten(route, "", RouteMeta::PUBLIC, &mut records);
        }
        Self { records }
    }

    /// The blog's route surface.
    pub fn standard() -> Self {
        Self::new(vec![
            Route::new("home", "/"),
            Route::new("about", "/about"),
            Route::new("categories", "/categories"),
            Route::new("category", "/categories/:id"),
            Route::new("dashboard", "/dashboard")
                .meta(RouteMeta::PROTECTED)
                .children(vec![
                    Route::new("dashboard-stats", "stats"),
                    Route::new("dashboard-blogs", "blogs"),
                    Route::new("dashboard-blog-new", "blogs/new"),
                    Route::new("dashboard-blog-edit", "blogs/:id/edit"),
                    Route::new("dashboard-blog-detail", "blogs/:id"),
                    Route::new("dashboard-profile", "profile"),
                ]),
            Route::new("login", "/login").meta(RouteMeta::GUEST_ONLY),
            Route::new("register", "/register").meta(RouteMeta::GUEST_ONLY),
            Route::new("blogs", "/blogs"),
            Route::new("blog-detail", "/blogs/:slug"),
        ])
    }

    /// Match a concrete path. Query string, fragment and trailing slashes are
    /// ignored; static segments beat parameters.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let parts = path_segments(path);

        self.records
            .iter()
            .filter(|r| r.segments.len() == parts.len())
            .filter_map(|record| {
                let mut params = Vec::new();
                let mut score = 0usize;
                for (segment, part) in record.segments.iter().zip(&parts) {
                    match segment {
                        Segment::Static(s) if s == part => score += 1,
                        Segment::Static(_) => return None,
                        Segment::Param(key) => params.push((key.clone(), (*part).to_string())),
                    }
                }
                Some((score, record, params))
            })
            // max_by_key keeps the last maximum; reverse so declaration order wins ties
            .rev()
            .max_by_key(|(score, _, _)| *score)
            .map(|(_, record, params)| RouteMatch {
                name: record.name.clone(),
                pattern: record.pattern.clone(),
                meta: record.meta,
                params,
            })
    }

    /// Path pattern of a named route.
    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.pattern.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// `(name, pattern, effective attributes)` for every route, in declaration
    /// order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, RouteMeta)> {
        self.records
            .iter()
            .map(|r| (r.name.as_str(), r.pattern.as_str(), r.meta))
    }
}

fn flatten(route: Route, parent_path: &str, parent_meta: RouteMeta, out: &mut Vec<Record>) {
    let pattern = join(parent_path, &route.path);
    let meta = route.meta.inherit(parent_meta);
    let segments = path_segments(&pattern)
        .into_iter()
        .map(|s| match s.strip_prefix(':') {
            Some(key) => Segment::Param(key.to_string()),
            None => Segment::Static(s.to_string()),
        })
        .collect();

    out.push(Record {
        name: route.name,
        pattern: if pattern.is_empty() { "/".to_string() } else { pattern.clone() },
        segments,
        meta,
    });

    for child in route.children {
        flatten(child, &pattern, meta, out);
    }
}
