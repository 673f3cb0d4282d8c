use axum::response::IntoResponse;

use crate::template::{Layout, Template, filters};

#[derive(askama::Template)]
#[template(path = "root.html")]
pub struct RootTemplate {
    pub layout: Layout,
}

#[derive(askama::Template)]
#[template(path = "mission.html")]
pub struct MissionTemplate {
    pub layout: Layout,
}

#[derive(askama::Template)]
#[template(path = "womb.html")]
pub struct WombTemplate {
    pub layout: Layout,
}

#[derive(askama::Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
}

#[derive(askama::Template)]
#[template(path = "jobs.html")]
pub struct JobsTemplate {
    pub layout: Layout,
}

pub async fn root(template: Template) -> impl IntoResponse {
    template.render(RootTemplate {
        layout: template.layout("root"),
    })
}

pub async fn mission(template: Template) -> impl IntoResponse {
    template.render(MissionTemplate {
        layout: template.layout("mission"),
    })
}

pub async fn womb(template: Template) -> impl IntoResponse {
    template.render(WombTemplate {
        layout: template.layout("womb"),
    })
}

pub async fn about(template: Template) -> impl IntoResponse {
    template.render(AboutTemplate {
        layout: template.layout("about"),
    })
}

pub async fn jobs(template: Template) -> impl IntoResponse {
    template.render(JobsTemplate {
        layout: template.layout("jobs"),
    })
}
