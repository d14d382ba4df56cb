// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod candidate_target;
pub mod content_record;
pub mod fetch;
pub mod run_event;
pub mod search_result;
pub mod trusted_domains;
