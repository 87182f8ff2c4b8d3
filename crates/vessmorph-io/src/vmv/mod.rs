// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! The VMV text format: a vertex list plus strands of 1-based vertex references.

mod reader;
mod writer;

pub use reader::VmvReader;
pub use writer::VmvWriter;

pub(crate) const PARAM_BEGIN: &str = "$PARAM_BEGIN";
pub(crate) const PARAM_END: &str = "$PARAM_END";
pub(crate) const VERT_LIST_BEGIN: &str = "$VERT_LIST_BEGIN";
pub(crate) const VERT_LIST_END: &str = "$VERT_LIST_END";
pub(crate) const STRANDS_LIST_BEGIN: &str = "$STRANDS_LIST_BEGIN";
pub(crate) const STRANDS_LIST_END: &str = "$STRANDS_LIST_END";

pub(crate) const NUM_VERTS: &str = "NUM_VERTS";
pub(crate) const NUM_STRANDS: &str = "NUM_STRANDS";
pub(crate) const NUM_ATTRIB_PER_VERT: &str = "NUM_ATTRIB_PER_VERT";
