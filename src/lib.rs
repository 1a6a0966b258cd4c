//! # Clinical Store
//!
//! Local persistence for a clinical record-keeping application: patients and
//! their visits, each stored as a single JSON array under one key of a
//! string-keyed store. Built for embedding in a UI host (Flutter, Tauri, a
//! webview shell) either as a Rust library or through a C-compatible FFI.
//!
//! ## Layers
//!
//! - [`key_value_store::KeyValueStore`] - the injected raw store. Backends:
//!   [`memory_store::MemoryStore`] and the LMDB-based [`lmdb_store::LmdbStore`].
//! - [`storage_service::StorageService`] - typed JSON save/load/remove with
//!   failure containment.
//! - [`repository::Repository`] - whole-collection CRUD for one entity type.
//! - [`visit_repository::VisitRepository`] and
//!   [`patient_repository::PatientRepository`] - the two collections, under
//!   the `"visits"` and `"patients"` keys.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clinical_store::{create_store, visit_create, visit_get_by_patient_id};
//! use std::ffi::CString;
//!
//! let db_name = CString::new("clinic_data").unwrap();
//! let state = create_store(db_name.as_ptr());
//!
//! let visit = CString::new(r#"{"id":"v1","patientId":"pat-1","visitDate":"2025-01-01T00:00:00Z","visitType":"initial","status":"completed"}"#).unwrap();
//! let result = visit_create(state, visit.as_ptr());
//!
//! let patient_id = CString::new("pat-1").unwrap();
//! let visits = visit_get_by_patient_id(state, patient_id.as_ptr());
//! ```
//!
//! ## FFI Functions
//!
//! Every function returns a JSON-encoded [`app_response::AppResponse`] that
//! must be released with [`free_response`].
//!
//! - [`create_store`] / [`create_store_with_config`] - open a store
//! - [`visit_get_all`], [`visit_get_by_patient_id`], [`visit_get_by_id`],
//!   [`visit_create`], [`visit_update`], [`visit_delete`], [`visit_clear_all`]
//! - [`patient_get_all`], [`patient_get_by_id`], [`patient_create`],
//!   [`patient_update`], [`patient_delete`], [`patient_clear_all`]
//! - [`close_store`], [`reset_store`], [`free_store`], [`free_response`]

pub mod app_response;
pub mod app_state;
pub mod entity;
pub mod key_value_store;
pub mod lmdb_store;
pub mod memory_store;
pub mod patient_model;
pub mod patient_repository;
pub mod repository;
pub mod storage_error;
pub mod storage_service;
pub mod store_config;
pub mod visit_model;
pub mod visit_repository;
mod test;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::app_state::AppState;
use crate::patient_model::Patient;
use crate::store_config::StoreConfig;
use crate::visit_model::Visit;

/// Opens (or creates) a store named `name` with default settings.
///
/// The environment lives in the `<name>.lmdb` directory.
///
/// # Returns
///
/// A pointer to the [`AppState`], or a null pointer when the name is null,
/// not UTF-8, or the database cannot be opened. Release it with
/// [`free_store`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(name: *const c_char) -> *mut AppState {
    if name.is_null() {
        warn!("Null name pointer passed to create_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    open_state(StoreConfig::named(name_str))
}

/// Opens a store from a JSON [`StoreConfig`] document.
///
/// ```json
/// { "name": "clinic_data", "map_size": 10485760, "max_dbs": 4, "sync_on_write": true }
/// ```
///
/// Returns a null pointer when the document is missing, malformed, or invalid.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store_with_config(config_json: *const c_char) -> *mut AppState {
    if config_json.is_null() {
        warn!("Null config pointer passed to create_store_with_config");
        return std::ptr::null_mut();
    }

    let raw = match unsafe { CStr::from_ptr(config_json).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match StoreConfig::from_json(raw) {
        Ok(config) => open_state(config),
        Err(e) => {
            warn!("Rejected store configuration: {e}");
            std::ptr::null_mut()
        }
    }
}

fn open_state(config: StoreConfig) -> *mut AppState {
    let lmdb_dir = config.lmdb_dir();
    info!("Attempting to open store at: {:?}", lmdb_dir);

    match AppState::open(config) {
        Ok(state) => {
            info!("Store initialized successfully");
            Box::into_raw(Box::new(state))
        }
        Err(e) => {
            warn!("Failed to initialize store at {:?}: {e}", lmdb_dir);
            std::ptr::null_mut()
        }
    }
}

/// Returns every stored visit as a JSON array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn visit_get_all(state: *mut AppState) -> *const c_char {
    let state = match state_ref(state, "visit_get_all") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    match state.visits.try_get_all() {
        Ok(visits) => json_response(&visits),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Returns the visits of one patient, in stored order, as a JSON array.
///
/// An unknown patient yields an empty array, not `NotFound`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn visit_get_by_patient_id(state: *mut AppState, patient_id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "visit_get_by_patient_id") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let patient_id = match c_ptr_to_string(patient_id, "patient_id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match state.visits.try_get_by_patient_id(&patient_id) {
        Ok(visits) => json_response(&visits),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Returns the first visit with `id`, or `NotFound`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn visit_get_by_id(state: *mut AppState, id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "visit_get_by_id") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match state.visits.try_get_by_visit_id(&id_str) {
        Ok(Some(visit)) => json_response(&visit),
        Ok(None) => response_to_c_string(&AppResponse::NotFound(format!("No visit found with id: {id_str}"))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Appends a visit. The id is not checked for duplicates.
///
/// # JSON Format
///
/// ```json
/// {
///   "id": "v1",
///   "patientId": "pat-1",
///   "visitDate": "2025-01-01T00:00:00Z",
///   "visitType": "initial",
///   "status": "completed"
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn visit_create(state: *mut AppState, json_ptr: *const c_char) -> *const c_char {
    let state = match state_ref(state, "visit_create") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let visit: Visit = match parse_json(json_ptr) {
        Ok(v) => v,
        Err(error_ptr) => return error_ptr,
    };

    match state.visits.try_create(visit.clone()) {
        Ok(()) => json_response(&visit),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Replaces every visit sharing the id of the given visit.
///
/// Responds `NotFound` when no visit matched; the collection is rewritten
/// unchanged in that case.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn visit_update(state: *mut AppState, json_ptr: *const c_char) -> *const c_char {
    let state = match state_ref(state, "visit_update") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let visit: Visit = match parse_json(json_ptr) {
        Ok(v) => v,
        Err(error_ptr) => return error_ptr,
    };

    match state.visits.try_update(visit.clone()) {
        Ok(0) => response_to_c_string(&AppResponse::NotFound(format!("No visit found with id: {}", visit.id))),
        Ok(_) => json_response(&visit),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Removes every visit with `id`. Responds `NotFound` when none matched.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn visit_delete(state: *mut AppState, id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "visit_delete") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match state.visits.try_delete(&id_str) {
        Ok(0) => response_to_c_string(&AppResponse::NotFound(format!("No visit found with id: {id_str}"))),
        Ok(removed) => response_to_c_string(&AppResponse::success(format!("{removed} visit(s) deleted"))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Deletes the whole visit collection.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn visit_clear_all(state: *mut AppState) -> *const c_char {
    let state = match state_ref(state, "visit_clear_all") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    match state.visits.try_clear_all() {
        Ok(()) => response_to_c_string(&AppResponse::success("All visits cleared successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Returns every stored patient as a JSON array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn patient_get_all(state: *mut AppState) -> *const c_char {
    let state = match state_ref(state, "patient_get_all") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    match state.patients.try_get_all() {
        Ok(patients) => json_response(&patients),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Returns the first patient with `id`, or `NotFound`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn patient_get_by_id(state: *mut AppState, id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "patient_get_by_id") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match state.patients.try_get_by_id(&id_str) {
        Ok(Some(patient)) => json_response(&patient),
        Ok(None) => response_to_c_string(&AppResponse::NotFound(format!("No patient found with id: {id_str}"))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Appends a patient. The id is not checked for duplicates.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn patient_create(state: *mut AppState, json_ptr: *const c_char) -> *const c_char {
    let state = match state_ref(state, "patient_create") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let patient: Patient = match parse_json(json_ptr) {
        Ok(p) => p,
        Err(error_ptr) => return error_ptr,
    };

    match state.patients.try_create(patient.clone()) {
        Ok(()) => json_response(&patient),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Replaces every patient sharing the id of the given patient.
///
/// Responds `NotFound` when no patient matched.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn patient_update(state: *mut AppState, json_ptr: *const c_char) -> *const c_char {
    let state = match state_ref(state, "patient_update") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let patient: Patient = match parse_json(json_ptr) {
        Ok(p) => p,
        Err(error_ptr) => return error_ptr,
    };

    match state.patients.try_update(patient.clone()) {
        Ok(0) => response_to_c_string(&AppResponse::NotFound(format!("No patient found with id: {}", patient.id))),
        Ok(_) => json_response(&patient),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Removes every patient with `id`. Responds `NotFound` when none matched.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn patient_delete(state: *mut AppState, id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "patient_delete") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match state.patients.try_delete(&id_str) {
        Ok(0) => response_to_c_string(&AppResponse::NotFound(format!("No patient found with id: {id_str}"))),
        Ok(removed) => response_to_c_string(&AppResponse::success(format!("{removed} patient(s) deleted"))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Deletes the whole patient collection.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn patient_clear_all(state: *mut AppState) -> *const c_char {
    let state = match state_ref(state, "patient_clear_all") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    match state.patients.try_clear_all() {
        Ok(()) => response_to_c_string(&AppResponse::success("All patients cleared successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Closes the LMDB environment behind the store.
///
/// The pointer stays valid; later calls answer with `DatabaseError` until
/// [`reset_store`] reopens it. Useful before a host hot restart.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(state: *mut AppState) -> *const c_char {
    let state = match state_ref(state, "close_store") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    match state.close() {
        Ok(()) => response_to_c_string(&AppResponse::success("Store closed successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Deletes the store's data directory and reopens an empty store under
/// `name_ptr`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reset_store(state: *mut AppState, name_ptr: *const c_char) -> *const c_char {
    let state = match state_ref(state, "reset_store") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let name = match c_ptr_to_string(name_ptr, "name") {
        Ok(name) => name,
        Err(error_ptr) => return error_ptr,
    };

    match state.reset(&name) {
        Ok(()) => response_to_c_string(&AppResponse::success(format!("Store '{name}' was reset successfully"))),
        Err(e) => response_to_c_string(&AppResponse::DatabaseError(format!("Error resetting store: {e}"))),
    }
}

/// Releases a store returned by [`create_store`]. Null is ignored.
#[no_mangle]
pub extern "C" fn free_store(state: *mut AppState) {
    if state.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(state) });
}

/// Releases a response string returned by any other function. Null is ignored.
#[no_mangle]
pub extern "C" fn free_response(response: *const c_char) {
    if response.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(response as *mut c_char) });
}

/// Serializes `value` and wraps it in an `Ok` response.
fn json_response<T: Serialize + ?Sized>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

fn state_ref<'a>(state: *mut AppState, fn_name: &str) -> Result<&'a AppState, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(s) => Ok(s),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn parse_json<T: DeserializeOwned>(json_ptr: *const c_char) -> Result<T, *const c_char> {
    let json_str = c_ptr_to_string(json_ptr, "JSON")?;
    serde_json::from_str(&json_str).map_err(|e| {
        let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
        response_to_c_string(&error)
    })
}

/// Converts an [`AppResponse`] to a C string owned by the caller.
///
/// Returns a null pointer if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust `String`.
///
/// On a null pointer or invalid UTF-8, returns a `BadRequest` response already
/// converted to a C string, ready to hand back to the caller.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
