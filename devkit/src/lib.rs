/*!
# PrintWatch DevKit - Stubs et utilitaires pour les tests

Bibliothèque facilitant les tests du gate et du board sans réseau réel:
- Probe simulée (répondeurs configurables, latence, hosts qui pendent)
- Gate de login simulé servant un rôle fixe
- Harness avec répertoire temporaire et serveur HTTP local
*/

pub mod gate_stub;
pub mod probe_stub;
pub mod test_utils;

pub use gate_stub::StubGate;
pub use probe_stub::StubProbe;
pub use test_utils::TestHarness;
