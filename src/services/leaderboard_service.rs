use sea_orm::sea_query::{Expr, Func, Order, SimpleExpr};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QuerySelect, QueryOrder};

use crate::models::dto::{CourseSummary, Totals};
use crate::models::{courses, reviews};
use crate::services::course_query::{AVG_RATING_SQL, course_summary_select};

const LEADERBOARD_SIZE: u64 = 10;

pub struct LeaderboardService;

impl LeaderboardService {
    /// Top 10 par nombre d'avis (puis moyenne desc, puis code)
    pub async fn most_reviewed(db: &DatabaseConnection) -> Result<Vec<CourseSummary>, DbErr> {
        Self::ranked(db, [("review_count", Order::Desc), ("avg_rating", Order::Desc)]).await
    }

    /// Top 10 par moyenne (puis nombre d'avis desc, puis code)
    pub async fn highest_rated(db: &DatabaseConnection) -> Result<Vec<CourseSummary>, DbErr> {
        Self::ranked(db, [("avg_rating", Order::Desc), ("review_count", Order::Desc)]).await
    }

    /// Totaux globaux : nombre de cours, nombre d'avis, moyenne générale arrondie
    pub async fn totals(db: &DatabaseConnection) -> Result<Totals, DbErr> {
        let total_courses = courses::Entity::find().count(db).await?;
        let total_reviews = reviews::Entity::find().count(db).await?;

        let average_overall = reviews::Entity::find()
            .select_only()
            .column_as(Expr::cust(AVG_RATING_SQL), "average_overall")
            .into_tuple::<Option<f64>>()
            .one(db)
            .await?
            .flatten();

        Ok(Totals {
            total_courses,
            total_reviews,
            average_overall,
        })
    }

    // Seuls les cours avec au moins un avis sont classés
    async fn ranked(
        db: &DatabaseConnection,
        order: [(&'static str, Order); 2],
    ) -> Result<Vec<CourseSummary>, DbErr> {
        let mut query = course_summary_select().having(
            Expr::expr(SimpleExpr::from(Func::count(Expr::col((reviews::Entity, reviews::Column::Id))))).gt(0),
        );

        for (alias, direction) in order {
            query = query.order_by(Expr::cust(alias), direction);
        }

        query
            .order_by_asc(courses::Column::CourseCode)
            .limit(LEADERBOARD_SIZE)
            .into_model::<CourseSummary>()
            .all(db)
            .await
    }
}
