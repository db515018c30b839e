/*!
# WebUI DevKit - Stubs et utilitaires de test

Bibliothèque facilitant les tests du noyau de synchro et des vues:
- Source d'état scriptée (pas de master réel)
- Builder de payloads `state.json`
- Harness d'événements au-dessus du `StateHub`
*/

pub mod mock_source;
pub mod state_builder;
pub mod test_utils;

pub use mock_source::MockStateSource;
pub use state_builder::StateBuilder;
pub use test_utils::TestHarness;
