// handlers/mod.rs - three security tiers
//
// public    no authentication                      /, /health, /auth/*, /subscribe/*, public listings
// protected admin JWT, admin + organization active  /api/admin/*
// elevated  superadmin JWT                          /api/superadmin/*

pub mod elevated;
pub mod protected;
pub mod public;

use serde::Deserialize;

/// `?status=` filter shared by listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// `{ "status": ... }` body shared by status-change endpoints
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}
