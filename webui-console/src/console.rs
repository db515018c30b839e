//! Page navigation and stdin commands of the terminal front end

use crate::views::browse::BrowseView;
use crate::views::dashboard::{DashboardSeries, DashboardView};
use crate::views::framework::FrameworkView;
use crate::views::frameworks::FrameworksView;
use crate::views::home::HomeView;
use crate::views::pailer::LogLink;
use crate::views::slave::SlaveView;
use crate::views::slaves::SlavesView;
use crate::views::table::Tables;
use anyhow::{bail, Result};
use std::time::Duration;
use webui_core::{Banner, JsonFetcher, Snapshot, StateHub};

/// A page the user can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Frameworks,
    Framework(String),
    Slaves,
    Slave {
        id: String,
        framework: Option<String>,
        executor: Option<String>,
    },
    Browse { slave: String, path: String },
    Dashboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(Route),
    /// Dismiss the error indicator and retry now.
    Retry,
    Sort { table: String, column: String },
    Log,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let arg = |i: usize| words.get(i).map(|w| w.to_string());
        let cmd = match words.as_slice() {
            ["r"] | ["retry"] => Command::Retry,
            ["q"] | ["quit"] => Command::Quit,
            ["log"] => Command::Log,
            ["sort", table, column] => Command::Sort {
                table: table.to_string(),
                column: column.to_string(),
            },
            ["home"] => Command::Open(Route::Home),
            ["frameworks"] => Command::Open(Route::Frameworks),
            ["framework", id] => Command::Open(Route::Framework(id.to_string())),
            ["slaves"] => Command::Open(Route::Slaves),
            ["slave", id, ..] if words.len() <= 4 => Command::Open(Route::Slave {
                id: id.to_string(),
                framework: arg(2),
                executor: arg(3),
            }),
            ["browse", slave] => Command::Open(Route::Browse {
                slave: slave.to_string(),
                path: String::new(),
            }),
            ["browse", slave, path] => Command::Open(Route::Browse {
                slave: slave.to_string(),
                path: path.to_string(),
            }),
            ["dashboard"] => Command::Open(Route::Dashboard),
            _ => bail!("unknown command: {}", line.trim()),
        };
        Ok(cmd)
    }
}

pub enum Page {
    Home(HomeView),
    Frameworks(FrameworksView),
    Framework(FrameworkView),
    Slaves(SlavesView),
    Slave(SlaveView),
    Browse(BrowseView),
    Dashboard(DashboardView),
}

impl Page {
    pub fn open(route: &Route, hub: &StateHub) -> Self {
        match route {
            Route::Home => Page::Home(HomeView::open(hub)),
            Route::Frameworks => Page::Frameworks(FrameworksView::open(hub)),
            Route::Framework(id) => Page::Framework(FrameworkView::open(hub, id)),
            Route::Slaves => Page::Slaves(SlavesView::open(hub)),
            Route::Slave { id, framework, executor } => Page::Slave(SlaveView::open(
                hub,
                id,
                framework.as_deref(),
                executor.as_deref(),
            )),
            Route::Browse { slave, path } => Page::Browse(BrowseView::new(slave, path)),
            Route::Dashboard => Page::Dashboard(DashboardView::open(hub)),
        }
    }

    pub fn tables_mut(&mut self) -> Option<&mut Tables> {
        match self {
            Page::Home(v) => Some(&mut v.tables),
            Page::Frameworks(v) => Some(&mut v.tables),
            Page::Framework(v) => Some(&mut v.tables),
            Page::Slaves(v) => Some(&mut v.tables),
            Page::Slave(v) => Some(&mut v.tables),
            Page::Browse(_) | Page::Dashboard(_) => None,
        }
    }

    pub fn log(&self, snapshot: &Snapshot) -> Result<Option<LogLink>> {
        match self {
            Page::Home(v) => Ok(Some(v.log(snapshot)?)),
            Page::Slave(v) => Ok(Some(v.log()?)),
            _ => Ok(None),
        }
    }

    /// Refreshes the page against `snapshot` and renders it.
    pub async fn render<F: JsonFetcher>(
        &mut self,
        snapshot: &Snapshot,
        fetcher: &F,
        series: &DashboardSeries,
    ) -> String {
        match self {
            Page::Home(v) => v.render(snapshot),
            Page::Frameworks(v) => v.render(snapshot),
            Page::Framework(v) => {
                v.update(snapshot);
                v.render()
            }
            Page::Slaves(v) => v.render(snapshot),
            Page::Slave(v) => {
                v.update(snapshot, fetcher).await;
                v.render()
            }
            Page::Browse(v) => {
                v.update(snapshot, fetcher).await;
                v.render()
            }
            Page::Dashboard(v) => v.render(snapshot, series),
        }
    }
}

fn secs(d: &Duration) -> u64 {
    d.as_millis().div_ceil(1000) as u64
}

pub fn banner_text(banner: &Banner) -> String {
    match banner {
        Banner::NoLeader => "No master is currently leading the cluster.".into(),
        Banner::NotLeader { leader, redirect_in } => format!(
            "This master is not the leader, redirecting to {} in {}s",
            leader.leader_url(),
            secs(redirect_in)
        ),
        Banner::FetchError { retry_in } => {
            format!("Failed to connect to the master! Retrying in {}s (r to retry now)", secs(retry_in))
        }
    }
}
