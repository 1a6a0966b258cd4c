//! # Test Suite for Clinical Store
//!
//! ## Test Categories
//!
//! ### 1. Storage Service Tests
//! - Typed save/load/remove/clear over the in-memory store
//! - Failure containment of the lenient API
//!
//! ### 2. Repository Tests
//! - Round trip, idempotent clear, update-replaces, delete-removes, filter order
//! - Duplicate id behaviour of `create` and `insert_unique`
//! - Behaviour when the injected store fails on read or write
//!
//! ### 3. LMDB Backend Tests
//! - Persistence across reopen, close, reset, quota exhaustion, concurrent reads
//!
//! ### 4. FFI Function Tests
//! - Every `extern "C"` function with success and error scenarios
//!
//! ## Running the Tests
//!
//! ```bash
//! cargo test
//! cargo test test_ffi_        # FFI tests
//! cargo test test_lmdb_       # LMDB backend tests
//! ```

#[cfg(test)]
pub mod tests {
    use std::ffi::{CStr, CString};
    use std::os::raw::c_char;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::app_response::AppResponse;
    use crate::app_state::AppState;
    use crate::key_value_store::KeyValueStore;
    use crate::lmdb_store::LmdbStore;
    use crate::memory_store::MemoryStore;
    use crate::patient_model::{Patient, PATIENTS_KEY};
    use crate::patient_repository::PatientRepository;
    use crate::repository::Repository;
    use crate::storage_error::{StorageError, StorageResult};
    use crate::storage_service::StorageService;
    use crate::store_config::StoreConfig;
    use crate::visit_model::{Visit, VISITS_KEY};
    use crate::visit_repository::VisitRepository;
    use crate::*;

    // Helper function to create test visits
    fn create_test_visit(id: &str, patient_id: &str) -> Visit {
        Visit::new(id, patient_id, "2025-01-01T00:00:00Z", "initial", "completed")
    }

    fn create_test_patient(id: &str) -> Patient {
        Patient {
            id: id.to_string(),
            first_name: Some("Andrea".to_string()),
            last_name: Some("Saade".to_string()),
            birth_date: Some("1982-03-20".to_string()),
            gender: Some("F".to_string()),
            email: Some(format!("{id}@example.com")),
            allergies: Some(vec!["penicillin".to_string()]),
            ..Patient::default()
        }
    }

    /// Store double whose reads and writes can be made to fail on demand.
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
    }

    impl FailingStore {
        fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        fn fail_reads(&self, fail: bool) {
            self.fail_reads.store(fail, Ordering::SeqCst);
        }

        fn check(&self, flag: &AtomicBool) -> StorageResult<()> {
            if flag.load(Ordering::SeqCst) {
                Err(StorageError::Unavailable("simulated failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.check(&self.fail_reads)?;
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.check(&self.fail_writes)?;
            self.inner.set(key, value)
        }

        fn delete(&self, key: &str) -> StorageResult<()> {
            self.check(&self.fail_writes)?;
            self.inner.delete(key)
        }

        fn clear(&self) -> StorageResult<()> {
            self.check(&self.fail_writes)?;
            self.inner.clear()
        }
    }

    fn temp_config(dir: &TempDir, name: &str) -> StoreConfig {
        StoreConfig::named(dir.path().join(name).to_string_lossy().to_string())
    }

    // ===============================
    // STORAGE SERVICE TESTS
    // ===============================

    #[test]
    fn test_storage_save_and_load() {
        let storage = StorageService::new(MemoryStore::new());
        storage.save("numbers", &vec![1, 2, 3]);

        let loaded: Option<Vec<i32>> = storage.load("numbers");
        assert_eq!(loaded, Some(vec![1, 2, 3]));

        let missing: Option<Vec<i32>> = storage.load("missing");
        assert!(missing.is_none());
    }

    #[test]
    fn test_storage_load_malformed_json_returns_none() {
        let store = MemoryStore::new();
        store.set("visits", "[{not json").unwrap();
        store.set("empty", "").unwrap();

        let storage = StorageService::new(&store);
        let loaded: Option<Vec<Visit>> = storage.load("visits");
        assert!(loaded.is_none());
        assert!(matches!(
            storage.try_load::<Vec<Visit>>("visits"),
            Err(StorageError::Serialization(_))
        ));

        let empty: Option<Vec<Visit>> = storage.load("empty");
        assert!(empty.is_none());
    }

    #[test]
    fn test_storage_remove_and_clear() {
        let store = MemoryStore::new();
        let storage = StorageService::new(&store);
        storage.save("a", &json!({"k": 1}));
        storage.save("b", &json!({"k": 2}));

        storage.remove("a");
        assert!(storage.load::<serde_json::Value>("a").is_none());
        assert_eq!(store.len(), 1);

        storage.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let store = FailingStore::default();
        let storage = StorageService::new(&store);
        storage.save("kept", &vec!["before"]);

        store.fail_writes(true);
        storage.save("kept", &vec!["after"]);
        storage.remove("kept");
        storage.clear();
        assert!(storage.try_save("kept", &vec!["after"]).is_err());

        store.fail_writes(false);
        let kept: Option<Vec<String>> = storage.load("kept");
        assert_eq!(kept, Some(vec!["before".to_string()]));

        store.fail_reads(true);
        let unreadable: Option<Vec<String>> = storage.load("kept");
        assert!(unreadable.is_none());
    }

    // ===============================
    // REPOSITORY TESTS
    // ===============================

    #[test]
    fn test_visit_concrete_scenario() {
        let visits = VisitRepository::new(MemoryStore::new());
        let visit = create_test_visit("v1", "pat-1");
        visits.create(visit.clone());

        assert_eq!(visits.get_by_patient_id("pat-1"), vec![visit.clone()]);
        assert_eq!(visits.get_by_visit_id("v1"), Some(visit));
        assert!(visits.get_by_visit_id("nonexistent").is_none());
    }

    #[test]
    fn test_visit_stored_layout() {
        let store = MemoryStore::new();
        let visits = VisitRepository::new(&store);
        visits.create(create_test_visit("v1", "pat-1").with_notes("Lumbar pain"));

        let raw = store.get(VISITS_KEY).unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            stored,
            json!([{
                "id": "v1",
                "patientId": "pat-1",
                "visitDate": "2025-01-01T00:00:00Z",
                "visitType": "initial",
                "status": "completed",
                "notes": "Lumbar pain"
            }])
        );
    }

    #[test]
    fn test_visit_unknown_fields_survive_rewrite() {
        let store = MemoryStore::new();
        store
            .set(
                VISITS_KEY,
                r#"[{"id":"v1","patientId":"p1","visitDate":"2025-01-01T00:00:00Z","professionalId":"prof-1","duration":45}]"#,
            )
            .unwrap();

        let visits = VisitRepository::new(&store);
        let mut visit = visits.get_by_visit_id("v1").unwrap();
        assert_eq!(visit.visit_type, "");
        assert_eq!(visit.extra.get("duration"), Some(&json!(45)));

        visit.status = "completed".to_string();
        visits.update(visit);

        let raw: serde_json::Value = serde_json::from_str(&store.get(VISITS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw[0]["professionalId"], json!("prof-1"));
        assert_eq!(raw[0]["status"], json!("completed"));
    }

    #[test]
    fn test_patient_round_trip() {
        let patients = PatientRepository::new(MemoryStore::new());
        let patient = create_test_patient("p1");
        patients.create(patient.clone());

        assert_eq!(patients.get_by_id("p1"), Some(patient));
        assert!(patients.get_by_id("p2").is_none());
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let store = MemoryStore::new();
        let visits = VisitRepository::new(&store);
        let patients = PatientRepository::new(&store);

        visits.clear_all();
        assert!(visits.get_all().is_empty());

        visits.create(create_test_visit("v1", "p1"));
        patients.create(create_test_patient("p1"));
        visits.clear_all();
        visits.clear_all();

        assert!(visits.get_all().is_empty());
        assert!(store.get(VISITS_KEY).unwrap().is_none());
        // Clearing visits leaves the patient collection alone
        assert_eq!(patients.get_all().len(), 1);
        assert!(store.contains(PATIENTS_KEY).unwrap());
    }

    #[test]
    fn test_update_replaces_not_appends() {
        let visits = VisitRepository::new(MemoryStore::new());
        visits.create(create_test_visit("v1", "p1"));
        visits.create(create_test_visit("v2", "p1"));

        let updated = create_test_visit("v1", "p1").with_notes("Progress is favourable");
        visits.update(updated.clone());

        let all = visits.get_all();
        assert_eq!(all.len(), 2);
        let matching: Vec<&Visit> = all.iter().filter(|v| v.id == "v1").collect();
        assert_eq!(matching, vec![&updated]);
        // Position is kept
        assert_eq!(all[0], updated);
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let patients = PatientRepository::new(MemoryStore::new());
        patients.create(create_test_patient("p1"));

        patients.update(create_test_patient("ghost"));
        assert_eq!(patients.try_update(create_test_patient("ghost")).unwrap(), 0);
        assert_eq!(patients.get_all(), vec![create_test_patient("p1")]);
    }

    #[test]
    fn test_delete_removes_exactly_matching_ids() {
        let patients = PatientRepository::new(MemoryStore::new());
        let a = create_test_patient("a");
        let b = create_test_patient("b");
        patients.create(a.clone());
        patients.create(b.clone());

        patients.delete(&a.id);
        assert_eq!(patients.get_all(), vec![b]);

        assert_eq!(patients.try_delete("nonexistent").unwrap(), 0);
        assert_eq!(patients.count(), 1);
    }

    #[test]
    fn test_filter_by_patient_keeps_stored_order() {
        let visits = VisitRepository::new(MemoryStore::new());
        let first = create_test_visit("v1", "p1");
        let other = create_test_visit("v2", "p2");
        let second = create_test_visit("v3", "p1");
        visits.create(first.clone());
        visits.create(other);
        visits.create(second.clone());

        assert_eq!(visits.get_by_patient_id("p1"), vec![first, second]);
        assert!(visits.get_by_patient_id("p3").is_empty());
    }

    #[test]
    fn test_create_does_not_check_duplicate_ids() {
        let visits = VisitRepository::new(MemoryStore::new());
        visits.create(create_test_visit("dup", "p1"));
        visits.create(create_test_visit("dup", "p2"));

        assert_eq!(visits.count(), 2);
        assert_eq!(visits.get_by_visit_id("dup").unwrap().patient_id, "p1");

        // update replaces every entry with the id
        let replacement = create_test_visit("dup", "p3");
        assert_eq!(visits.try_update(replacement.clone()).unwrap(), 2);
        assert!(visits.get_all().iter().all(|v| *v == replacement));

        // delete removes every entry with the id
        assert_eq!(visits.try_delete("dup").unwrap(), 2);
        assert!(visits.get_all().is_empty());
    }

    #[test]
    fn test_insert_unique_rejects_duplicates() {
        let patients = PatientRepository::new(MemoryStore::new());
        patients.insert_unique(create_test_patient("p1")).unwrap();

        let result = patients.insert_unique(create_test_patient("p1"));
        assert!(matches!(result, Err(StorageError::DuplicateKey(id)) if id == "p1"));
        assert_eq!(patients.count(), 1);
        assert!(patients.exists("p1"));
        assert!(!patients.exists("p2"));
    }

    #[test]
    fn test_create_write_failure_is_contained() {
        let store = FailingStore::default();
        let visits = VisitRepository::new(&store);
        visits.create(create_test_visit("v1", "p1"));

        store.fail_writes(true);
        visits.create(create_test_visit("v2", "p1"));
        visits.update(create_test_visit("v1", "p9"));
        visits.delete("v1");
        visits.clear_all();
        assert!(visits.try_create(create_test_visit("v3", "p1")).is_err());

        // Reads still work and reflect the state before the failures
        let all = visits.get_all();
        assert_eq!(all, vec![create_test_visit("v1", "p1")]);
    }

    #[test]
    fn test_read_failure_does_not_clobber_collection() {
        let store = FailingStore::default();
        let patients = PatientRepository::new(&store);
        patients.create(create_test_patient("p1"));

        store.fail_reads(true);
        assert!(patients.get_all().is_empty());
        assert!(patients.get_by_id("p1").is_none());
        patients.create(create_test_patient("p2"));
        assert!(matches!(patients.try_get_all(), Err(StorageError::Unavailable(_))));

        store.fail_reads(false);
        assert_eq!(patients.get_all(), vec![create_test_patient("p1")]);
    }

    #[test]
    fn test_malformed_collection_is_replaced_by_lenient_writes() {
        let store = MemoryStore::new();
        let visits = VisitRepository::new(&store);
        store.set(VISITS_KEY, "[{not json").unwrap();

        assert!(visits.get_all().is_empty());
        assert!(matches!(visits.try_create(create_test_visit("v0", "p1")), Err(StorageError::Serialization(_))));

        visits.create(create_test_visit("v1", "p1"));
        assert_eq!(visits.get_all(), vec![create_test_visit("v1", "p1")]);

        store.set(VISITS_KEY, "{\"id\": \"v1\"}").unwrap();
        visits.update(create_test_visit("v1", "p2"));
        assert!(visits.get_all().is_empty());
        visits.create(create_test_visit("v2", "p1"));
        store.set(VISITS_KEY, "garbage").unwrap();
        visits.delete("v2");
        assert_eq!(store.get(VISITS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_repository_custom_key() {
        let store = MemoryStore::new();
        let archived: Repository<Visit, &MemoryStore> = Repository::with_key(&store, "archived_visits");
        archived.create(create_test_visit("v1", "p1"));

        assert_eq!(archived.key(), "archived_visits");
        assert!(store.contains("archived_visits").unwrap());
        assert!(VisitRepository::new(&store).get_all().is_empty());
    }

    #[test]
    fn test_patient_display_name() {
        let by_parts = create_test_patient("p1");
        assert_eq!(by_parts.display_name(), "Andrea Saade");

        let by_name = Patient::new("p2", " Andreina Saade ");
        assert_eq!(by_name.display_name(), "Andreina Saade");

        let only_last = Patient {
            id: "p3".to_string(),
            last_name: Some("Saade".to_string()),
            ..Patient::default()
        };
        assert_eq!(only_last.display_name(), "Saade");
    }

    // ===============================
    // LMDB BACKEND TESTS
    // ===============================

    #[test]
    fn test_lmdb_basic_operations() {
        let dir = TempDir::new().unwrap();
        let store = LmdbStore::init(dir.path().join("basic").to_string_lossy().to_string()).unwrap();
        assert!(store.is_open());

        assert!(store.get("missing").unwrap().is_none());
        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap(), Some("value".to_string()));
        assert!(store.contains("key").unwrap());

        store.delete("key").unwrap();
        store.delete("key").unwrap();
        assert!(store.get("key").unwrap().is_none());

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.clear().unwrap();
        assert!(store.get("a").unwrap().is_none());
        assert!(store.get("b").unwrap().is_none());
    }

    #[test]
    fn test_lmdb_data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let config = temp_config(&dir, "reopen");

        {
            let store = Arc::new(LmdbStore::open(config.clone()).unwrap());
            let visits = VisitRepository::new(Arc::clone(&store));
            visits.create(create_test_visit("v1", "pat-1"));
        }

        let store = Arc::new(LmdbStore::open(config).unwrap());
        let visits = VisitRepository::new(store);
        assert_eq!(visits.get_all(), vec![create_test_visit("v1", "pat-1")]);
    }

    #[test]
    fn test_lmdb_closed_store_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = LmdbStore::open(temp_config(&dir, "closed")).unwrap();
        let patients = PatientRepository::new(&store);
        patients.create(create_test_patient("p1"));

        store.close_database().unwrap();
        store.close_database().unwrap();
        assert!(!store.is_open());

        assert!(matches!(store.get(PATIENTS_KEY), Err(StorageError::Unavailable(_))));
        assert!(patients.get_all().is_empty());
        patients.create(create_test_patient("p2"));
        assert!(patients.try_create(create_test_patient("p2")).is_err());
    }

    #[test]
    fn test_lmdb_reset_database() {
        let dir = TempDir::new().unwrap();
        let config = temp_config(&dir, "reset_old");
        let store = LmdbStore::open(config.clone()).unwrap();
        store.set("key", "value").unwrap();

        let new_name = dir.path().join("reset_new").to_string_lossy().to_string();
        store.reset_database(&new_name).unwrap();

        assert!(store.is_open());
        assert!(store.get("key").unwrap().is_none());
        assert!(!config.lmdb_dir().exists());
        assert_eq!(store.path().unwrap(), StoreConfig::named(new_name).lmdb_dir());
    }

    #[test]
    fn test_lmdb_reset_with_invalid_name_keeps_data() {
        let dir = TempDir::new().unwrap();
        let config = temp_config(&dir, "reset_keep");
        let store = LmdbStore::open(config.clone()).unwrap();
        let visits = VisitRepository::new(&store);
        visits.create(create_test_visit("v1", "p1"));

        assert!(matches!(store.reset_database("  "), Err(StorageError::Config(_))));
        assert!(matches!(store.reset_database(""), Err(StorageError::Config(_))));

        assert!(store.is_open());
        assert!(config.lmdb_dir().exists());
        assert_eq!(store.path().unwrap(), config.lmdb_dir());
        assert_eq!(visits.get_all(), vec![create_test_visit("v1", "p1")]);
    }

    #[test]
    fn test_lmdb_quota_exceeded() {
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir, "quota");
        config.map_size = 64 * 1024;
        let store = LmdbStore::open(config).unwrap();
        let visits = VisitRepository::new(&store);
        visits.create(create_test_visit("v1", "p1"));

        let huge = create_test_visit("v2", "p1").with_notes("x".repeat(1024 * 1024));
        assert!(matches!(visits.try_create(huge.clone()), Err(StorageError::QuotaExceeded)));

        visits.create(huge);
        assert_eq!(visits.get_all(), vec![create_test_visit("v1", "p1")]);
    }

    #[test]
    fn test_lmdb_concurrent_reads() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LmdbStore::open(temp_config(&dir, "concurrent")).unwrap());
        let visits = VisitRepository::new(Arc::clone(&store));
        for i in 1..=10 {
            visits.create(create_test_visit(&format!("v{i}"), "p1"));
        }

        let mut handles = vec![];
        for thread_id in 0..4 {
            let reader = VisitRepository::new(Arc::clone(&store));
            handles.push(thread::spawn(move || {
                for i in 1..=10 {
                    let visit = reader.try_get_by_visit_id(&format!("v{i}"));
                    assert!(
                        matches!(visit, Ok(Some(_))),
                        "Thread {} failed to read visit {}",
                        thread_id,
                        i
                    );
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }

    // ===============================
    // FFI FUNCTION TESTS
    // ===============================

    fn read_response(ptr: *const c_char) -> AppResponse {
        assert!(!ptr.is_null(), "FFI returned a null response");
        let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        free_response(ptr);
        serde_json::from_str(&text).unwrap()
    }

    fn ok_payload(response: AppResponse) -> serde_json::Value {
        match response {
            AppResponse::Ok(json) => serde_json::from_str(&json).unwrap(),
            other => panic!("Expected Ok response, got {other:?}"),
        }
    }

    fn ffi_store(dir: &TempDir, name: &str) -> *mut AppState {
        let name = CString::new(dir.path().join(name).to_string_lossy().to_string()).unwrap();
        let state = create_store(name.as_ptr());
        assert!(!state.is_null());
        state
    }

    #[test]
    fn test_ffi_create_store_null_and_invalid() {
        assert!(create_store(std::ptr::null()).is_null());

        let invalid = [0xffu8, 0xfe, 0x00];
        assert!(create_store(invalid.as_ptr() as *const c_char).is_null());

        assert!(create_store_with_config(std::ptr::null()).is_null());
        let bad_config = CString::new(r#"{"name":""}"#).unwrap();
        assert!(create_store_with_config(bad_config.as_ptr()).is_null());
    }

    #[test]
    fn test_ffi_create_store_with_config() {
        let dir = TempDir::new().unwrap();
        let name = dir.path().join("configured").to_string_lossy().to_string();
        let config = CString::new(json!({"name": name, "max_dbs": 2}).to_string()).unwrap();

        let state = create_store_with_config(config.as_ptr());
        assert!(!state.is_null());
        assert!(dir.path().join("configured.lmdb").exists());
        assert!(unsafe { &*state }.backend().is_open());
        free_store(state);
    }

    #[test]
    fn test_ffi_visit_workflow() {
        let dir = TempDir::new().unwrap();
        let state = ffi_store(&dir, "ffi_visits");

        let visit_json = json!({
            "id": "v1",
            "patientId": "pat-1",
            "visitDate": "2025-01-01T00:00:00Z",
            "visitType": "initial",
            "status": "completed"
        });
        let visit = CString::new(visit_json.to_string()).unwrap();
        assert_eq!(ok_payload(read_response(visit_create(state, visit.as_ptr()))), visit_json);

        let patient_id = CString::new("pat-1").unwrap();
        let by_patient = ok_payload(read_response(visit_get_by_patient_id(state, patient_id.as_ptr())));
        assert_eq!(by_patient, json!([visit_json.clone()]));

        let id = CString::new("v1").unwrap();
        assert_eq!(ok_payload(read_response(visit_get_by_id(state, id.as_ptr()))), visit_json);

        let missing = CString::new("nonexistent").unwrap();
        assert!(matches!(
            read_response(visit_get_by_id(state, missing.as_ptr())),
            AppResponse::NotFound(_)
        ));

        let mut updated_json = visit_json.clone();
        updated_json["status"] = json!("scheduled");
        let updated = CString::new(updated_json.to_string()).unwrap();
        assert_eq!(ok_payload(read_response(visit_update(state, updated.as_ptr()))), updated_json);

        let all = ok_payload(read_response(visit_get_all(state)));
        assert_eq!(all, json!([updated_json]));

        assert!(read_response(visit_delete(state, id.as_ptr())).is_ok());
        assert!(matches!(
            read_response(visit_delete(state, id.as_ptr())),
            AppResponse::NotFound(_)
        ));

        assert!(read_response(visit_clear_all(state)).is_ok());
        assert_eq!(ok_payload(read_response(visit_get_all(state))), json!([]));

        free_store(state);
    }

    #[test]
    fn test_ffi_patient_workflow() {
        let dir = TempDir::new().unwrap();
        let state = ffi_store(&dir, "ffi_patients");

        let patient_json = json!({"id": "p1", "firstName": "Andrea", "lastName": "Saade", "allergies": ["latex"]});
        let patient = CString::new(patient_json.to_string()).unwrap();
        assert!(read_response(patient_create(state, patient.as_ptr())).is_ok());

        let id = CString::new("p1").unwrap();
        assert_eq!(ok_payload(read_response(patient_get_by_id(state, id.as_ptr()))), patient_json);

        let ghost = CString::new(json!({"id": "ghost", "name": "Nobody"}).to_string()).unwrap();
        assert!(matches!(
            read_response(patient_update(state, ghost.as_ptr())),
            AppResponse::NotFound(_)
        ));

        let renamed_json = json!({"id": "p1", "name": "Andreina Saade"});
        let renamed = CString::new(renamed_json.to_string()).unwrap();
        assert!(read_response(patient_update(state, renamed.as_ptr())).is_ok());
        assert_eq!(ok_payload(read_response(patient_get_all(state))), json!([renamed_json]));

        assert!(read_response(patient_delete(state, id.as_ptr())).is_ok());
        assert!(matches!(
            read_response(patient_get_by_id(state, id.as_ptr())),
            AppResponse::NotFound(_)
        ));

        assert!(read_response(patient_clear_all(state)).is_ok());
        free_store(state);
    }

    #[test]
    fn test_ffi_null_pointers() {
        let dir = TempDir::new().unwrap();
        let state = ffi_store(&dir, "ffi_null");
        let null_state: *mut AppState = std::ptr::null_mut();
        let id = CString::new("v1").unwrap();

        for response in [
            visit_get_all(null_state),
            visit_get_by_id(null_state, id.as_ptr()),
            visit_create(null_state, id.as_ptr()),
            visit_clear_all(null_state),
            patient_get_all(null_state),
            patient_delete(null_state, id.as_ptr()),
            close_store(null_state),
            visit_get_by_id(state, std::ptr::null()),
            visit_get_by_patient_id(state, std::ptr::null()),
            patient_create(state, std::ptr::null()),
            reset_store(state, std::ptr::null()),
        ] {
            assert!(matches!(read_response(response), AppResponse::BadRequest(_)));
        }

        free_store(state);
        free_store(std::ptr::null_mut());
        free_response(std::ptr::null());
    }

    #[test]
    fn test_ffi_invalid_json() {
        let dir = TempDir::new().unwrap();
        let state = ffi_store(&dir, "ffi_invalid_json");

        let malformed = CString::new("{not json").unwrap();
        assert!(matches!(
            read_response(visit_create(state, malformed.as_ptr())),
            AppResponse::SerializationError(_)
        ));

        let missing_fields = CString::new(r#"{"id":"v1"}"#).unwrap();
        assert!(matches!(
            read_response(visit_create(state, missing_fields.as_ptr())),
            AppResponse::SerializationError(_)
        ));

        assert_eq!(ok_payload(read_response(visit_get_all(state))), json!([]));
        free_store(state);
    }

    #[test]
    fn test_ffi_close_and_reset() {
        let dir = TempDir::new().unwrap();
        let state = ffi_store(&dir, "ffi_close");

        let patient = CString::new(r#"{"id":"p1","name":"Test"}"#).unwrap();
        assert!(read_response(patient_create(state, patient.as_ptr())).is_ok());

        assert!(read_response(close_store(state)).is_ok());
        assert!(matches!(read_response(patient_get_all(state)), AppResponse::DatabaseError(_)));

        let new_name = CString::new(dir.path().join("ffi_reopened").to_string_lossy().to_string()).unwrap();
        assert!(read_response(reset_store(state, new_name.as_ptr())).is_ok());
        assert_eq!(ok_payload(read_response(patient_get_all(state))), json!([]));

        free_store(state);
    }
}
