mod common;
mod dashboard;
mod routing;
