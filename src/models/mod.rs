// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque entité correspond à une table SQLite avec SeaORM.
//
// Liste des modules:
//   - users : Comptes de connexion (créés au seed uniquement)
//   - courses : Catalogue de cours (créé au seed uniquement)
//   - reviews : Avis et notes (append-only)
//   - dto : Lignes agrégées et structures de réponse
//
// Points d'attention:
//   - Les noms de colonnes suivent le schéma historique (coursecode,
//     overallrating, dateposted...) via column_name
//
// ============================================================================

pub mod users;
pub mod courses;
pub mod reviews;
pub mod dto;
